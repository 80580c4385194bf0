use serde::{Deserialize, Serialize};

/// Profile document stored under `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Authenticated backend session for one signed-in browser. The id token
/// is the bearer credential for document and object-store calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
    pub id_token: String,
    pub refresh_token: String,
}
