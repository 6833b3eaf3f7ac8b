//! Session management for multi-turn chat

use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::errors::GovRagError;
use crate::errors::Result;
use crate::models::ConversationHistory;

/// Longest accepted client-supplied session id
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Live sessions kept unless configured otherwise
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Chat session data
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub session_id: String,
    /// Locked for the whole exchange, so turns of one session never interleave
    pub history: Arc<Mutex<ConversationHistory>>,
    pub created_at: u64,
    pub last_activity: u64,
}

impl ChatSession {
    #[must_use]
    pub fn new(session_id: String, max_messages: usize) -> Self {
        let now = now_secs();
        Self {
            session_id,
            history: Arc::new(Mutex::new(ConversationHistory::with_limit(max_messages))),
            created_at: now,
            last_activity: now,
        }
    }

    #[must_use]
    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        now_secs().saturating_sub(self.last_activity) > timeout_secs
    }

    /// An exchange currently holds the history lock
    #[must_use]
    pub fn in_use(&self) -> bool {
        self.history.try_lock().is_err()
    }
}

/// Session manager with automatic cleanup
pub struct SessionManager {
    sessions: Arc<DashMap<String, ChatSession>>,
    session_timeout: Duration,
    max_messages: usize,
    max_sessions: usize,
}

impl SessionManager {
    /// Must be called inside a tokio runtime; spawns the expiry sweep
    #[must_use]
    pub fn new(session_timeout_secs: u64, max_messages: usize) -> Self {
        let sessions = Arc::new(DashMap::new());

        let sessions_clone = Arc::clone(&sessions);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Self::cleanup_expired_sessions(&sessions_clone, session_timeout_secs);
            }
        });

        Self {
            sessions,
            session_timeout: Duration::from_secs(session_timeout_secs),
            max_messages,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    #[must_use]
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Existing session for `session_id`, or a fresh one registered under it
    pub fn get_or_create(&self, session_id: &str) -> Result<ChatSession> {
        let session_id = session_id.trim();
        if session_id.is_empty() || session_id.len() > MAX_SESSION_ID_LEN {
            return Err(GovRagError::InvalidQuestion(format!(
                "session_id must be 1-{MAX_SESSION_ID_LEN} characters"
            )));
        }

        if let Some(mut existing) = self.sessions.get_mut(session_id) {
            existing.last_activity = now_secs();
            return Ok(existing.clone());
        }

        if self.sessions.len() >= self.max_sessions {
            self.cleanup_expired();
        }
        if self.sessions.len() >= self.max_sessions {
            self.evict_least_recent();
        }

        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Created chat session {}", session_id);
                ChatSession::new(session_id.to_string(), self.max_messages)
            });
        entry.last_activity = now_secs();
        Ok(entry.clone())
    }

    /// Mark a session active; called when an exchange finishes
    pub fn touch(&self, session_id: &str) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.last_activity = now_secs();
        }
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for longer than the timeout
    pub fn cleanup_expired(&self) {
        Self::cleanup_expired_sessions(&self.sessions, self.session_timeout.as_secs());
    }

    fn cleanup_expired_sessions(sessions: &DashMap<String, ChatSession>, timeout_secs: u64) {
        let expired: Vec<String> = sessions
            .iter()
            .filter(|entry| entry.value().is_expired(timeout_secs) && !entry.value().in_use())
            .map(|entry| entry.key().clone())
            .collect();

        for session_id in expired {
            sessions.remove(&session_id);
            info!("Cleaned up expired session: {}", session_id);
        }
    }

    /// Sessions mid-exchange are never evicted; with all of them busy the map grows past the cap
    fn evict_least_recent(&self) {
        let oldest = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().in_use())
            .min_by_key(|entry| entry.value().last_activity)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(session_id) => {
                self.sessions.remove(&session_id);
                info!("Evicted least recently active session: {}", session_id);
            }
            None => warn!(
                "All {} sessions are busy; exceeding the session cap",
                self.sessions.len()
            ),
        }
    }
}
