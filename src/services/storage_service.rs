use async_trait::async_trait;
use log::error;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde_json::Value;

use crate::config;
use crate::services::{GatewayError, GatewayResult};

/// Per-user namespaced object store. Object names look like
/// `uploads/{uid}/{filename}`; uploading to an existing name overwrites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStoreApi: Send + Sync {
    /// Stores the bytes and returns a durable download URL.
    async fn upload(
        &self,
        id_token: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> GatewayResult<String>;
    /// Lists object names under a prefix.
    async fn list(&self, id_token: &str, prefix: &str) -> GatewayResult<Vec<String>>;
    /// Resolves an object name to its download URL.
    async fn download_url(&self, id_token: &str, object: &str) -> GatewayResult<String>;
    async fn delete(&self, id_token: &str, object: &str) -> GatewayResult<()>;
}

pub struct StorageClient {
    http: Client,
    base_url: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(base_url: String, bucket: String) -> Self {
        StorageClient {
            http: Client::new(),
            base_url,
            bucket,
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::storage_base_url(), config::storage_bucket())
    }

    fn object_url(&self, object: &str) -> String {
        format!(
            "{}/b/{}/o/{}",
            self.base_url,
            self.bucket,
            utf8_percent_encode(object, NON_ALPHANUMERIC)
        )
    }

    /// Builds the tokenized download URL from object metadata.
    fn tokenized_url(&self, object: &str, metadata: &Value) -> String {
        let token = metadata["downloadTokens"]
            .as_str()
            .and_then(|tokens| tokens.split(',').next())
            .unwrap_or_default();
        format!("{}?alt=media&token={}", self.object_url(object), token)
    }
}

async fn check_status(operation: &str, response: reqwest::Response) -> GatewayResult<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await.unwrap_or_default());
    }
    let message = response.text().await.unwrap_or_default();
    error!("object store {} failed: {} {}", operation, status, message);
    Err(GatewayError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ObjectStoreApi for StorageClient {
    async fn upload(
        &self,
        id_token: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> GatewayResult<String> {
        let url = format!(
            "{}/b/{}/o?uploadType=media&name={}",
            self.base_url,
            self.bucket,
            utf8_percent_encode(object, NON_ALPHANUMERIC)
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(id_token)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        let metadata = check_status("upload", response).await?;
        Ok(self.tokenized_url(object, &metadata))
    }

    async fn list(&self, id_token: &str, prefix: &str) -> GatewayResult<Vec<String>> {
        let url = format!(
            "{}/b/{}/o?prefix={}",
            self.base_url,
            self.bucket,
            utf8_percent_encode(prefix, NON_ALPHANUMERIC)
        );
        let response = self.http.get(url).bearer_auth(id_token).send().await?;
        let payload = check_status("list", response).await?;
        let names = payload["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }

    async fn download_url(&self, id_token: &str, object: &str) -> GatewayResult<String> {
        let response = self
            .http
            .get(self.object_url(object))
            .bearer_auth(id_token)
            .send()
            .await?;
        let metadata = check_status("metadata", response).await?;
        Ok(self.tokenized_url(object, &metadata))
    }

    async fn delete(&self, id_token: &str, object: &str) -> GatewayResult<()> {
        let response = self
            .http
            .delete(self.object_url(object))
            .bearer_auth(id_token)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        error!("object store delete failed: {} {}", status, message);
        Err(GatewayError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}
