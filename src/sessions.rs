#![cfg(feature = "web")]

use crate::session::Session;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Cookie that carries the page session id.
pub const SESSION_COOKIE: &str = "sheetjump_session";

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// Open page sessions, keyed by the id stored in [`SESSION_COOKIE`].
///
/// Each page load gets a fresh session; sessions idle for longer than the
/// configured ttl are dropped.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        SessionRegistry {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Start a new empty session and return its id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Instant::now();

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        if sessions.len() < before {
            log::info!("expired {} idle sessions", before - sessions.len());
        }

        sessions.insert(
            id.clone(),
            Entry {
                session: Arc::new(Mutex::new(Session::new())),
                last_seen: now,
            },
        );
        log::info!("session {} created ({} open)", id, sessions.len());
        id
    }

    /// Look up a live session and mark it as used.
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let entry = sessions.get_mut(id)?;
        if now.duration_since(entry.last_seen) >= self.ttl {
            sessions.remove(id);
            log::info!("session {} expired", id);
            return None;
        }
        entry.last_seen = now;
        Some(Arc::clone(&entry.session))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
