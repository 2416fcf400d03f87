//! Per-player session store.
//!
//! Handlers load a session by id, mutate their own copy and save it back.
//! Requests of one player are assumed to be sequential, so the last save wins.

use crate::types::{Session, SessionId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A session copied out of the store
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub id: SessionId,
    pub session: Session,
    /// True when no stored session matched and a fresh one was created
    pub is_new: bool,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Replace the session with a fresh one. Known ids are kept, unknown ones replaced.
    pub async fn reset(&self, id: Option<&str>) -> SessionId {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(id) {
                *session = Session::default();
                tracing::debug!(session_id = id, "Session reset");
                return id.to_string();
            }
        }

        Self::purge_expired(&mut sessions, self.ttl);
        Self::evict_to_fit(&mut sessions, self.max_sessions);
        let id = ulid::Ulid::new().to_string();
        sessions.insert(id.clone(), Session::default());
        tracing::debug!(session_id = %id, "Session created");
        id
    }

    /// Copy a session out of the store, creating one if the id is missing or unknown
    pub async fn load(&self, id: Option<&str>) -> LoadedSession {
        if let Some(id) = id {
            if let Some(session) = self.sessions.read().await.get(id) {
                return LoadedSession {
                    id: id.to_string(),
                    session: session.clone(),
                    is_new: false,
                };
            }
        }

        let id = self.reset(None).await;
        LoadedSession {
            id,
            session: Session::default(),
            is_new: true,
        }
    }

    /// Write a session back. Sessions evicted meanwhile are not resurrected.
    pub async fn save(&self, id: &str, mut session: Session) {
        session.last_seen = Utc::now();
        if let Some(slot) = self.sessions.write().await.get_mut(id) {
            *slot = session;
        }
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn purge_expired(sessions: &mut HashMap<SessionId, Session>, ttl: Duration) {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return;
        };
        let cutoff = Utc::now() - ttl;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen >= cutoff);

        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!("Purged {} idle sessions", removed);
        }
    }

    /// Drop the least recently seen sessions until one more fits under the cap
    fn evict_to_fit(sessions: &mut HashMap<SessionId, Session>, max_sessions: usize) {
        while sessions.len() >= max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::warn!(session_id = %oldest, "Session store full, evicted oldest session");
        }
    }
}
