use std::env;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DOCSTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";
const CHAT_COMPLETION_URL: &str = "http://localhost:5000/chat";
const CLIENT_SECRET_PATH: &str = "./cfg/client_secret.json";
const DEV_API_KEY: &str = "dev-key";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Base URL of the identity backend (sign-in/sign-up REST surface).
pub fn identity_base_url() -> String {
    env_or("IDENTITY_BASE_URL", IDENTITY_BASE_URL)
}

/// Base URL of the per-user document store.
pub fn docstore_base_url() -> String {
    env_or("DOCSTORE_BASE_URL", DOCSTORE_BASE_URL)
}

/// Base URL of the per-user object store.
pub fn storage_base_url() -> String {
    env_or("STORAGE_BASE_URL", STORAGE_BASE_URL)
}

/// Endpoint of the chat-completion service.
pub fn chat_completion_url() -> String {
    env_or("CHAT_COMPLETION_URL", CHAT_COMPLETION_URL)
}

pub fn project_id() -> String {
    env_or("BACKEND_PROJECT_ID", "studychat-dev")
}

pub fn storage_bucket() -> String {
    env::var("STORAGE_BUCKET").unwrap_or_else(|_| format!("{}.appspot.com", project_id()))
}

/// Web API key sent as a query parameter on identity calls.
pub fn web_api_key() -> String {
    env_or("BACKEND_API_KEY", DEV_API_KEY)
}

/// Path to the Google OAuth client secret JSON used by the federated login flow.
pub fn client_secret_path() -> String {
    env_or("OAUTH_CLIENT_SECRET", CLIENT_SECRET_PATH)
}

pub fn oauth_redirect_url() -> String {
    env_or(
        "OAUTH_REDIRECT_URL",
        "http://localhost:8080/auth/google/callback",
    )
}

pub fn bind_address() -> (String, u16) {
    let host = env_or("BIND_HOST", "127.0.0.1");
    let port = env_or("BIND_PORT", "8080").parse().unwrap_or(8080);
    (host, port)
}
