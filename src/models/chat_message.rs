use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One answered question within a day's conversation.
///
/// Created by the chat-completion call, persisted once, immutable after
/// that. Every field falls back to an empty value when absent on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub heading1: String,
    #[serde(default)]
    pub heading2: Vec<String>,
    #[serde(default)]
    pub key_takeaways: String,
    /// Subtopic title to its sequence of points.
    #[serde(default)]
    pub points: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub example: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// One line in the conversation-history list: a past day's key and the
/// heading of that day's first message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub heading1: Option<String>,
}
