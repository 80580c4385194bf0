pub mod auth_user;
pub mod chat_message;
pub mod global_session_manager;
pub mod user_session;
