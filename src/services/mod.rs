pub mod auth_service;
pub mod chat_service;
pub mod completion_service;
pub mod docstore_service;
pub mod identity_service;
pub mod storage_service;

use thiserror::Error;

/// Failure taxonomy shared by every gateway. Gateways never panic and a
/// raw transport error never crosses this boundary; handlers translate
/// these into HTTP responses.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No current session; the common short-circuit.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Network or service failure on the way to the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Human-readable rejection, surfaced to the user as-is.
    #[error("{0}")]
    Validation(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::Transport(error.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
