//! [`SessionStore`] for [`MemoryStore`].

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{SessionId, UserId};
use rally_entity::{Board, Participant, Phase, Session, SessionState};

use super::MemoryStore;
use super::record::SessionRecord;
use crate::traits::{NewSession, SessionStore};

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, new: NewSession) -> AppResult<Session> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Session name is required"));
        }

        let join_code_hash = match new.join_code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => Some(self.hasher.hash(code)?),
            None => None,
        };
        let facilitator_code_hash = match new.facilitator_code.as_deref().filter(|c| !c.is_empty())
        {
            Some(code) => Some(self.hasher.hash(code)?),
            None => None,
        };

        let now = Utc::now();
        let session = Session {
            id: SessionId::new(),
            kind: new.kind,
            name: name.to_string(),
            phase: new.kind.initial_phase(),
            facilitators: vec![new.created_by],
            created_by: new.created_by,
            has_join_code: join_code_hash.is_some(),
            has_facilitator_code: facilitator_code_hash.is_some(),
            settings: new.settings,
            created_at: now,
            updated_at: now,
        };

        let record = SessionRecord {
            session: session.clone(),
            join_code_hash,
            facilitator_code_hash,
            participants: vec![Participant::new(new.created_by, new.creator_name)],
            board: Board::empty(new.kind),
        };
        self.sessions.insert(session.id, record);

        info!(
            session_id = %session.id,
            kind = %session.kind,
            created_by = %session.created_by,
            "Session created"
        );
        Ok(session)
    }

    async fn get_session(&self, session_id: SessionId) -> AppResult<Session> {
        self.read(session_id, |r| Ok(r.session.clone()))
    }

    async fn session_state(&self, session_id: SessionId) -> AppResult<SessionState> {
        self.read(session_id, |r| Ok(r.state()))
    }

    async fn delete_session(&self, session_id: SessionId) -> AppResult<()> {
        self.sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))
    }

    async fn add_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
        name: &str,
        spectator: bool,
    ) -> AppResult<Vec<Participant>> {
        self.write(session_id, |r| {
            match r.participants.iter_mut().find(|p| p.user_id == user_id) {
                Some(existing) => {
                    existing.abandoned = false;
                    if !name.is_empty() {
                        existing.name = name.to_string();
                    }
                }
                None => {
                    let mut participant = Participant::new(user_id, name);
                    participant.spectator = spectator;
                    r.participants.push(participant);
                }
            }
            Ok(r.participants.clone())
        })
    }

    async fn get_participants(&self, session_id: SessionId) -> AppResult<Vec<Participant>> {
        self.read(session_id, |r| Ok(r.participants.clone()))
    }

    async fn get_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Option<Participant>> {
        self.read(session_id, |r| {
            Ok(r.participants.iter().find(|p| p.user_id == user_id).cloned())
        })
    }

    async fn set_participant_active(
        &self,
        session_id: SessionId,
        user_id: UserId,
        active: bool,
    ) -> AppResult<Vec<Participant>> {
        self.write(session_id, |r| {
            r.participant_mut(user_id)?.active = active;
            Ok(r.participants.clone())
        })
    }

    async fn abandon_participant(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Vec<Participant>> {
        self.write(session_id, |r| {
            let participant = r.participant_mut(user_id)?;
            participant.abandoned = true;
            participant.active = false;
            Ok(r.participants.clone())
        })
    }

    async fn set_spectator(
        &self,
        session_id: SessionId,
        user_id: UserId,
        spectator: bool,
    ) -> AppResult<Vec<Participant>> {
        self.write(session_id, |r| {
            r.participant_mut(user_id)?.spectator = spectator;
            Ok(r.participants.clone())
        })
    }

    async fn add_facilitator(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Vec<UserId>> {
        self.write(session_id, |r| {
            if !r.participants.iter().any(|p| p.user_id == user_id) {
                return Err(AppError::not_found(format!(
                    "User {user_id} is not a participant"
                )));
            }
            if !r.session.facilitators.contains(&user_id) {
                r.session.facilitators.push(user_id);
            }
            Ok(r.session.facilitators.clone())
        })
    }

    async fn remove_facilitator(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> AppResult<Vec<UserId>> {
        self.write(session_id, |r| {
            let facilitators = &mut r.session.facilitators;
            if !facilitators.contains(&user_id) {
                return Ok(facilitators.clone());
            }
            if facilitators.len() == 1 {
                return Err(AppError::only_facilitator());
            }
            facilitators.retain(|id| *id != user_id);
            Ok(facilitators.clone())
        })
    }

    async fn verify_join_code(&self, session_id: SessionId, code: Option<&str>) -> AppResult<bool> {
        let hash = self.read(session_id, |r| Ok(r.join_code_hash.clone()))?;
        match (hash, code) {
            (None, _) => Ok(true),
            (Some(_), None) => Ok(false),
            (Some(hash), Some(code)) => self.hasher.verify(code, &hash),
        }
    }

    async fn verify_facilitator_code(&self, session_id: SessionId, code: &str) -> AppResult<bool> {
        let hash = self.read(session_id, |r| Ok(r.facilitator_code_hash.clone()))?;
        match hash {
            Some(hash) => self.hasher.verify(code, &hash),
            None => Ok(false),
        }
    }

    async fn set_phase(&self, session_id: SessionId, phase: Phase) -> AppResult<Session> {
        self.write(session_id, |r| {
            if !r.session.kind.phases().contains(&phase) {
                return Err(AppError::validation(format!(
                    "Phase '{phase}' does not apply to {} sessions",
                    r.session.kind
                )));
            }
            r.session.phase = phase;
            if let Board::Retro(board) = &mut r.board {
                board.ready_users.clear();
            }
            Ok(r.session.clone())
        })
    }
}
