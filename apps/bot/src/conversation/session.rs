//! Per-user conversation sessions with idle expiry.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::conversation::job_title::JobTitle;

/// Identifies one user's conversation in one chat, as assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub user_id: i64,
}

/// Where the conversation is, with the fields collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AwaitingTitle,
    AwaitingLevel { job_title: JobTitle },
    AwaitingIndustry { job_title: JobTitle, job_level: String },
}

impl Step {
    /// Numeric state id (1, 2, 3), used in logs.
    pub fn id(&self) -> u8 {
        match self {
            Step::AwaitingTitle => 1,
            Step::AwaitingLevel { .. } => 2,
            Step::AwaitingIndustry { .. } => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub step: Step,
    last_activity: Instant,
}

impl Session {
    fn at(step: Step) -> Self {
        Self {
            step,
            last_activity: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_activity.elapsed() > ttl
    }
}

/// In-memory session map. The lock is only held for map operations, never
/// across an await on anything else.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionKey, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Removes and returns the live session for `key`. Stale sessions are evicted
    /// and reported as absent.
    pub async fn take(&self, key: SessionKey) -> Option<Session> {
        let session = self.sessions.lock().await.remove(&key)?;
        if session.is_expired(self.ttl) {
            debug!(
                "Session for user {} expired at step {}",
                key.user_id,
                session.step.id()
            );
            return None;
        }
        Some(session)
    }

    /// Stores `step` as the current state for `key`, refreshing its activity time.
    pub async fn put(&self, key: SessionKey, step: Step) {
        self.sessions.lock().await.insert(key, Session::at(step));
    }

    /// Opens a fresh session at `AwaitingTitle` unless `key` already has a live
    /// one. Returns false when a live session exists.
    pub async fn begin(&self, key: SessionKey) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(&key).is_some_and(|s| !s.is_expired(self.ttl)) {
            return false;
        }
        sessions.insert(key, Session::at(Step::AwaitingTitle));
        true
    }

    /// Evicts every stale session, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl));
        before - sessions.len()
    }

    /// Number of live sessions; stale ones awaiting purge are not counted.
    pub async fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|s| !s.is_expired(self.ttl))
            .count()
    }
}
