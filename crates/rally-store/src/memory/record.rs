//! Stored form of a session.

use chrono::Utc;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::UserId;
use rally_entity::poker::PokerBoard;
use rally_entity::retro::RetroBoard;
use rally_entity::storyboard::StoryboardBoard;
use rally_entity::{Board, Participant, Session, SessionState};

/// A session with its hashed codes, roster, and board.
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub session: Session,
    pub join_code_hash: Option<String>,
    pub facilitator_code_hash: Option<String>,
    pub participants: Vec<Participant>,
    pub board: Board,
}

impl SessionRecord {
    pub fn touch(&mut self) {
        self.session.updated_at = Utc::now();
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            session: self.session.clone(),
            participants: self.participants.clone(),
            board: self.board.clone(),
        }
    }

    pub fn participant_mut(&mut self, user_id: UserId) -> AppResult<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} is not a participant")))
    }

    pub fn poker(&self) -> AppResult<&PokerBoard> {
        match &self.board {
            Board::Poker(board) => Ok(board),
            _ => Err(wrong_kind("poker")),
        }
    }

    pub fn poker_mut(&mut self) -> AppResult<&mut PokerBoard> {
        match &mut self.board {
            Board::Poker(board) => Ok(board),
            _ => Err(wrong_kind("poker")),
        }
    }

    pub fn retro(&self) -> AppResult<&RetroBoard> {
        match &self.board {
            Board::Retro(board) => Ok(board),
            _ => Err(wrong_kind("retro")),
        }
    }

    pub fn retro_mut(&mut self) -> AppResult<&mut RetroBoard> {
        match &mut self.board {
            Board::Retro(board) => Ok(board),
            _ => Err(wrong_kind("retro")),
        }
    }

    pub fn storyboard(&self) -> AppResult<&StoryboardBoard> {
        match &self.board {
            Board::Storyboard(board) => Ok(board),
            _ => Err(wrong_kind("storyboard")),
        }
    }

    pub fn storyboard_mut(&mut self) -> AppResult<&mut StoryboardBoard> {
        match &mut self.board {
            Board::Storyboard(board) => Ok(board),
            _ => Err(wrong_kind("storyboard")),
        }
    }
}

fn wrong_kind(expected: &str) -> AppError {
    AppError::validation(format!("Session is not a {expected} session"))
}
