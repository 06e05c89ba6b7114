//! In-process implementation of the persistence collaborator.
//!
//! Every session lives in one [`DashMap`] entry, so each trait call holds
//! exactly one shard lock and observes a consistent record. Passcodes are
//! hashed with Argon2 before they are stored.

mod alert;
mod poker;
mod record;
mod retro;
mod session;
mod storyboard;

use dashmap::DashMap;

use rally_auth::PasscodeHasher;
use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{AlertId, SessionId};
use rally_entity::Alert;

use record::SessionRecord;

/// DashMap-backed store holding every session and alert in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Session records keyed by ID.
    sessions: DashMap<SessionId, SessionRecord>,
    /// Global alerts keyed by ID.
    alerts: DashMap<AlertId, Alert>,
    /// Passcode hasher.
    hasher: PasscodeHasher,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Run `f` against a session record.
    fn read<T>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&SessionRecord) -> AppResult<T>,
    ) -> AppResult<T> {
        let record = self
            .sessions
            .get(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        f(record.value())
    }

    /// Run `f` against a mutable session record and bump `updated_at`.
    fn write<T>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut SessionRecord) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut record = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        let out = f(record.value_mut())?;
        record.touch();
        Ok(out)
    }
}

fn session_not_found(session_id: SessionId) -> AppError {
    AppError::not_found(format!("Session {session_id} not found"))
}
