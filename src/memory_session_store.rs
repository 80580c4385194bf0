use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use anyhow::anyhow;
use futures::FutureExt; // for .boxed()
use tokio::sync::Mutex;
use uuid::Uuid;

struct SessionEntry {
    state: HashMap<String, String>,
    expires: Instant,
}

impl SessionEntry {
    fn live(&self, now: Instant) -> bool {
        now < self.expires
    }
}

/// In-memory cookie-session store. The map is shared behind an `Arc` so
/// every server worker sees the same sessions.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(
        &self,
        session_key: &SessionKey,
    ) -> impl Future<Output = Result<Option<HashMap<String, String>>, LoadError>> {
        let sessions = Arc::clone(&self.sessions);
        let key = session_key.as_ref().to_owned();
        async move {
            let sessions = sessions.lock().await;
            let now = Instant::now();
            let state = sessions
                .get(&key)
                .filter(|entry| entry.live(now))
                .map(|entry| entry.state.clone());
            Ok(state)
        }
        .boxed()
    }

    fn save(
        &self,
        session_state: HashMap<String, String>,
        ttl: &Duration,
    ) -> impl Future<Output = Result<SessionKey, SaveError>> {
        let sessions = Arc::clone(&self.sessions);
        let ttl = *ttl;
        async move {
            let mut sessions = sessions.lock().await;
            let now = Instant::now();
            // Saving is the natural moment to drop expired entries.
            sessions.retain(|_, entry| entry.live(now));
            let key = Uuid::new_v4().to_string();
            let entry = SessionEntry {
                state: session_state,
                expires: now + ttl.unsigned_abs(),
            };
            sessions.insert(key.clone(), entry);
            let session_key = SessionKey::try_from(key)
                .map_err(|e| SaveError::Other(anyhow!("invalid session key: {}", e)))?;
            Ok(session_key)
        }
        .boxed()
    }

    fn update(
        &self,
        session_key: SessionKey,
        session_state: HashMap<String, String>,
        ttl: &Duration,
    ) -> impl Future<Output = Result<SessionKey, UpdateError>> {
        let sessions = Arc::clone(&self.sessions);
        let ttl = *ttl;
        let key = session_key.as_ref().to_owned();
        async move {
            let mut sessions = sessions.lock().await;
            let entry = SessionEntry {
                state: session_state,
                expires: Instant::now() + ttl.unsigned_abs(),
            };
            sessions.insert(key, entry);
            Ok(session_key)
        }
        .boxed()
    }

    fn update_ttl(
        &self,
        session_key: &SessionKey,
        ttl: &Duration,
    ) -> impl Future<Output = Result<(), anyhow::Error>> {
        let sessions = Arc::clone(&self.sessions);
        let ttl = *ttl;
        let key = session_key.as_ref().to_owned();
        async move {
            let mut sessions = sessions.lock().await;
            match sessions.get_mut(&key) {
                Some(entry) => {
                    entry.expires = Instant::now() + ttl.unsigned_abs();
                    Ok(())
                }
                None => Err(anyhow!("Session not found")),
            }
        }
        .boxed()
    }

    fn delete(
        &self,
        session_key: &SessionKey,
    ) -> impl Future<Output = Result<(), anyhow::Error>> {
        let sessions = Arc::clone(&self.sessions);
        let key = session_key.as_ref().to_owned();
        async move {
            let mut sessions = sessions.lock().await;
            sessions.remove(&key);
            Ok(())
        }
        .boxed()
    }
}
