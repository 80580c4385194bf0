pub mod app_state;
pub mod auth_routes;
pub mod chat_routes;
pub mod file_routes;
