//! In-memory session store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::Session;

/// A session behind its own lock, so turns within it run one at a time.
pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Return the session for `id`, or start a fresh one.
    ///
    /// The returned flag is true when a new session was created.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (SharedSession, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return (session, false);
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(id, session.clone());
        tracing::info!(session_id = %id, "Created chat session");
        (session, true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for longer than the TTL. Busy sessions are kept.
    pub async fn remove_expired(&self) -> usize {
        let cutoff = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl));
        let Some(cutoff) = cutoff else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => s.last_active() >= cutoff,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!(removed, remaining = sessions.len(), "Expired idle chat sessions");
        }
        removed
    }
}
