use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use crate::UserSession;

/// Map from session id (the value inside the cookie) to chat-page
/// state, shared across every server worker.
#[derive(Clone)]
pub struct GlobalSessionManager {
    sessions: Arc<Mutex<HashMap<String, UserSession>>>,
}

impl GlobalSessionManager {
    pub fn new() -> Self {
        GlobalSessionManager {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Stores the page state for a session id, replacing any previous
    /// state. Handlers call this to write back after every mutation.
    pub fn insert(&self, session_id: String, session: UserSession) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(session_id, session);
    }

    /// Clones out the page state for a cookie's session id.
    pub fn get(&self, session_id: &str) -> Option<UserSession> {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(session_id).cloned()
    }

    /// Drops a session on logout; missing ids are ignored.
    pub fn remove(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.remove(session_id);
    }
}

impl Default for GlobalSessionManager {
    fn default() -> Self {
        Self::new()
    }
}
