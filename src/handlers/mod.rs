pub mod auth_handler;
pub mod chat_handler;
pub mod file_handler;

use actix_session::Session;
use actix_web::HttpResponse;
use serde_json::json;

use crate::models::global_session_manager::GlobalSessionManager;
use crate::services::GatewayError;
use crate::UserSession;

/// Translates a gateway failure into the HTTP response the page sees.
/// Validation messages pass through verbatim; backend detail stays in the
/// log.
pub fn error_response(error: &GatewayError) -> HttpResponse {
    match error {
        GatewayError::NotAuthenticated => {
            HttpResponse::Unauthorized().json(json!({"error": "Not authenticated"}))
        }
        GatewayError::Validation(message) => {
            HttpResponse::BadRequest().json(json!({"error": message}))
        }
        GatewayError::Transport(_) | GatewayError::Backend { .. } => {
            HttpResponse::BadGateway().json(json!({"error": "Backend unavailable"}))
        }
    }
}

/// Resolves the session cookie to the stored page state.
pub fn current_session(
    manager: &GlobalSessionManager,
    session: &Session,
) -> Option<(String, UserSession)> {
    let session_id = session.get::<String>("session_id").ok().flatten()?;
    let state = manager.get(&session_id)?;
    Some((session_id, state))
}
