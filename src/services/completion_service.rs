use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config;
use crate::models::chat_message::ChatMessage;
use crate::services::{GatewayError, GatewayResult};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    query: &'a str,
    files: &'a [String],
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    query: String,
    #[serde(default)]
    response: CompletionBody,
}

#[derive(Deserialize, Default)]
struct CompletionBody {
    #[serde(default)]
    heading1: String,
    #[serde(default)]
    heading2: Vec<String>,
    #[serde(default)]
    key_takeaways: String,
    #[serde(default)]
    points: HashMap<String, Vec<String>>,
    #[serde(default)]
    example: Vec<String>,
    #[serde(default)]
    summary: String,
}

impl CompletionEnvelope {
    fn into_message(self) -> ChatMessage {
        ChatMessage {
            query: self.query,
            heading1: self.response.heading1,
            heading2: self.response.heading2,
            key_takeaways: self.response.key_takeaways,
            points: self.response.points,
            example: self.response.example,
            summary: self.response.summary,
        }
    }
}

/// The chat-completion HTTP service: one question plus the attached file
/// references in, one structured answer out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(
        &self,
        query: &str,
        files: &[String],
        user_id: &str,
    ) -> GatewayResult<ChatMessage>;
}

pub struct CompletionClient {
    http: Client,
    url: String,
}

impl CompletionClient {
    pub fn new(url: String) -> Self {
        CompletionClient {
            http: Client::new(),
            url,
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::chat_completion_url())
    }
}

#[async_trait]
impl CompletionApi for CompletionClient {
    async fn complete(
        &self,
        query: &str,
        files: &[String],
        user_id: &str,
    ) -> GatewayResult<ChatMessage> {
        let body = CompletionRequest {
            query,
            files,
            user_id,
        };
        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("completion call failed: {} {}", status, message);
            return Err(GatewayError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        let envelope: CompletionEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(envelope.into_message())
    }
}
