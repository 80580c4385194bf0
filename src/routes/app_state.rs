use std::sync::Arc;

use crate::models::global_session_manager::GlobalSessionManager;
use crate::services::auth_service::AuthGateway;
use crate::services::chat_service::ChatGateway;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGateway>,
    pub chat: Arc<ChatGateway>,
    pub session_manager: GlobalSessionManager,
}
