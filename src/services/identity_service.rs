use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::services::{GatewayError, GatewayResult};

/// Token bundle returned by the identity backend on any sign-in shaped
/// call.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBundle {
    #[serde(rename = "localId")]
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(default, rename = "refreshToken")]
    pub refresh_token: String,
}

/// Account details from the lookup endpoint.
#[derive(Debug, Clone, Default)]
pub struct AccountInfo {
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> GatewayResult<TokenBundle>;
    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<TokenBundle>;
    async fn send_verification_email(&self, id_token: &str) -> GatewayResult<()>;
    async fn lookup(&self, id_token: &str) -> GatewayResult<AccountInfo>;
    async fn update_password(&self, id_token: &str, new_password: &str)
        -> GatewayResult<TokenBundle>;
    /// Exchanges a federated provider credential for a backend session.
    async fn sign_in_with_idp(&self, provider_token: &str) -> GatewayResult<TokenBundle>;
}

/// REST client for the identity backend. Calls are keyed by the web API
/// key; credential rejections come back as 400s with a short message.
pub struct IdentityClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        IdentityClient {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::identity_base_url(), config::web_api_key())
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, operation, self.api_key)
    }

    async fn post(&self, operation: &str, body: Value) -> GatewayResult<Value> {
        let response = self.http.post(self.endpoint(operation)).json(&body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let payload: Value = response.json().await.unwrap_or_default();
        let message = payload["error"]["message"]
            .as_str()
            .unwrap_or("unknown backend error")
            .to_string();
        error!("identity call {} failed: {} {}", operation, status, message);
        if status.as_u16() == 400 {
            Err(GatewayError::Validation(message))
        } else {
            Err(GatewayError::Backend {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn parse_tokens(value: Value) -> GatewayResult<TokenBundle> {
        serde_json::from_value(value).map_err(|e| GatewayError::Transport(e.to_string()))
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<TokenBundle> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        Self::parse_tokens(self.post("signInWithPassword", body).await?)
    }

    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<TokenBundle> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        Self::parse_tokens(self.post("signUp", body).await?)
    }

    async fn send_verification_email(&self, id_token: &str) -> GatewayResult<()> {
        let body = json!({
            "requestType": "VERIFY_EMAIL",
            "idToken": id_token,
        });
        self.post("sendOobCode", body).await?;
        Ok(())
    }

    async fn lookup(&self, id_token: &str) -> GatewayResult<AccountInfo> {
        let payload = self.post("lookup", json!({ "idToken": id_token })).await?;
        let account = &payload["users"][0];
        Ok(AccountInfo {
            email: account["email"].as_str().unwrap_or_default().to_string(),
            display_name: account["displayName"].as_str().unwrap_or_default().to_string(),
            email_verified: account["emailVerified"].as_bool().unwrap_or(false),
        })
    }

    async fn update_password(
        &self,
        id_token: &str,
        new_password: &str,
    ) -> GatewayResult<TokenBundle> {
        let body = json!({
            "idToken": id_token,
            "password": new_password,
            "returnSecureToken": true,
        });
        Self::parse_tokens(self.post("update", body).await?)
    }

    async fn sign_in_with_idp(&self, provider_token: &str) -> GatewayResult<TokenBundle> {
        let body = json!({
            "postBody": format!("access_token={}&providerId=google.com", provider_token),
            "requestUri": config::oauth_redirect_url(),
            "returnSecureToken": true,
        });
        Self::parse_tokens(self.post("signInWithIdp", body).await?)
    }
}
