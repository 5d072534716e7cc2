// Server-side session store.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use campus_core::Session;

#[derive(Clone, Debug)]
pub struct StoredSession {
    pub session: Session,
    /// Token issued by the identity service, needed to sign out there.
    pub provider_token: Option<String>,
    pub expires_at: u64,
}

impl StoredSession {
    fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Live sessions keyed by token id (`jti`).
///
/// A session token is honoured only while its entry is here; sign-out
/// removes it and expired entries are dropped on access.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
}

fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, jti: impl Into<String>, entry: StoredSession) {
        self.sessions.write().await.insert(jti.into(), entry);
    }

    pub async fn get(&self, jti: &str) -> Option<StoredSession> {
        let entry = self.sessions.read().await.get(jti).cloned()?;
        if entry.is_expired(now()) {
            self.sessions.write().await.remove(jti);
            return None;
        }
        Some(entry)
    }

    pub async fn remove(&self, jti: &str) -> Option<StoredSession> {
        self.sessions.write().await.remove(jti)
    }

    /// Drop every expired session; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
