pub mod config;
pub mod helpers;
pub mod memory_session_store;
pub mod models;
pub mod services;
pub mod handlers;
pub mod routes;

pub use models::user_session::UserSession;
