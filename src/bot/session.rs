//! Per-user matching sessions.
//!
//! Sessions live in memory only. They are lost on restart and dropped after
//! half an hour without messages. Each user has one async mutex, held for the
//! whole handling of a message.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::cache::{CacheConfig, TypedCache};
use crate::vk::Candidate;

/// Ephemeral state of one conversation.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_candidate: Option<Candidate>,
    search_offset: u32,
}

impl Session {
    /// Last candidate shown, if any.
    pub fn current_candidate(&self) -> Option<&Candidate> {
        self.current_candidate.as_ref()
    }

    pub fn search_offset(&self) -> u32 {
        self.search_offset
    }

    /// Move the search window forward. Always moves by at least one.
    pub fn advance(&mut self, step: u32) -> u32 {
        self.search_offset = self.search_offset.saturating_add(step.max(1));
        self.search_offset
    }

    /// Only the matcher calls this, after a successful find.
    pub(crate) fn set_current(&mut self, candidate: Candidate) {
        self.current_candidate = Some(candidate);
    }
}

/// All live sessions, keyed by VK user id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: TypedCache<i64, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::sessions())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            sessions: TypedCache::new("sessions", config),
        }
    }

    /// Lock a user's session, creating it on first use or after expiry.
    pub async fn lock(&self, user_id: i64) -> OwnedMutexGuard<Session> {
        let cell = self.sessions.get_or_insert_with(user_id, Arc::default);
        cell.lock_owned().await
    }
}
