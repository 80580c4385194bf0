use log::info;
use std::sync::Arc;

use crate::helpers;
use crate::models::auth_user::AuthSession;
use crate::models::chat_message::{ChatMessage, HistoryEntry};
use crate::services::completion_service::CompletionApi;
use crate::services::docstore_service::DocStoreApi;
use crate::services::storage_service::ObjectStoreApi;
use crate::services::{GatewayError, GatewayResult};

/// Wraps file storage, conversation persistence, and the completion
/// call. All operations act on one authenticated user's namespace.
pub struct ChatGateway {
    objects: Arc<dyn ObjectStoreApi>,
    docstore: Arc<dyn DocStoreApi>,
    completion: Arc<dyn CompletionApi>,
    /// Conversation key for "now"; swapped out in tests to pin today.
    today: fn() -> String,
}

impl ChatGateway {
    pub fn new(
        objects: Arc<dyn ObjectStoreApi>,
        docstore: Arc<dyn DocStoreApi>,
        completion: Arc<dyn CompletionApi>,
    ) -> Self {
        ChatGateway {
            objects,
            docstore,
            completion,
            today: helpers::today_key,
        }
    }

    pub fn with_today_source(mut self, today: fn() -> String) -> Self {
        self.today = today;
        self
    }

    fn uploads_prefix(uid: &str) -> String {
        format!("uploads/{}/", uid)
    }

    fn object_path(uid: &str, filename: &str) -> String {
        format!("uploads/{}/{}", uid, filename)
    }

    fn conversation_path(uid: &str, date_key: &str) -> String {
        format!("users/{}/chats/{}", uid, date_key)
    }

    fn messages_path(uid: &str, date_key: &str) -> String {
        format!("users/{}/chats/{}/messages", uid, date_key)
    }

    /// Stores the bytes under the user's namespace keyed by the original
    /// filename and returns the download URL. Re-uploading the same name
    /// overwrites, which is the backend default.
    pub async fn upload_file(
        &self,
        session: &AuthSession,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> GatewayResult<String> {
        let object = Self::object_path(&session.uid, filename);
        self.objects
            .upload(&session.id_token, &object, bytes, content_type)
            .await
    }

    /// Resolves every object under the user's namespace to a download
    /// URL.
    pub async fn get_files(&self, session: &AuthSession) -> GatewayResult<Vec<String>> {
        let names = self
            .objects
            .list(&session.id_token, &Self::uploads_prefix(&session.uid))
            .await?;
        let mut urls = Vec::with_capacity(names.len());
        for name in names {
            urls.push(self.objects.download_url(&session.id_token, &name).await?);
        }
        Ok(urls)
    }

    pub async fn delete_file(&self, session: &AuthSession, filename: &str) -> GatewayResult<()> {
        let object = Self::object_path(&session.uid, filename);
        self.objects.delete(&session.id_token, &object).await
    }

    /// Ordered messages for one day, defaulting to today. An absent
    /// conversation is an empty sequence, never an error.
    pub async fn get_chat_data(
        &self,
        session: &AuthSession,
        date: Option<&str>,
    ) -> GatewayResult<Vec<ChatMessage>> {
        let key = date.map(String::from).unwrap_or_else(self.today);
        let documents = self
            .docstore
            .list_documents(
                &session.id_token,
                &Self::messages_path(&session.uid, &key),
                true,
            )
            .await?;
        let messages = documents
            .into_iter()
            .map(|doc| serde_json::from_value(doc.fields).unwrap_or_default())
            .collect();
        Ok(messages)
    }

    /// First-message headings for every past day's conversation. Today's
    /// key is excluded; the current day belongs to the chat page, not the
    /// history list.
    pub async fn get_history(&self, session: &AuthSession) -> GatewayResult<Vec<HistoryEntry>> {
        let today = (self.today)();
        let days = self
            .docstore
            .list_documents(
                &session.id_token,
                &format!("users/{}/chats", session.uid),
                false,
            )
            .await?;
        let mut entries = Vec::new();
        for day in days {
            if day.id == today {
                continue;
            }
            let messages = self
                .docstore
                .list_documents(
                    &session.id_token,
                    &Self::messages_path(&session.uid, &day.id),
                    true,
                )
                .await?;
            let heading1 = messages
                .first()
                .and_then(|doc| doc.fields["heading1"].as_str().map(String::from));
            entries.push(HistoryEntry {
                date: day.id,
                heading1,
            });
        }
        Ok(entries)
    }

    /// Sends the question to the completion service and persists the
    /// answer. The message is returned only when both steps succeed: the
    /// page must never display a message it cannot reload later.
    pub async fn send_message(
        &self,
        session: &AuthSession,
        query: &str,
        files: &[String],
        date: Option<&str>,
    ) -> GatewayResult<ChatMessage> {
        let message = self
            .completion
            .complete(query, files, &session.uid)
            .await?;
        self.save_message(session, &message, date).await?;
        Ok(message)
    }

    /// Persistence protocol: create-or-touch the day's conversation
    /// document, then append the message to its subcollection. Both
    /// writes carry a server timestamp; retrieval orders by the message's
    /// one.
    async fn save_message(
        &self,
        session: &AuthSession,
        message: &ChatMessage,
        date: Option<&str>,
    ) -> GatewayResult<()> {
        let key = date.map(String::from).unwrap_or_else(self.today);
        self.docstore
            .set_document(
                &session.id_token,
                &Self::conversation_path(&session.uid, &key),
                serde_json::json!({}),
            )
            .await?;
        let fields = serde_json::to_value(message)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let id = self
            .docstore
            .add_document(
                &session.id_token,
                &Self::messages_path(&session.uid, &key),
                fields,
            )
            .await?;
        info!("persisted message {} in conversation {}", id, key);
        Ok(())
    }
}
