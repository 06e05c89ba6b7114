//! Full materialized session state.

use serde::{Deserialize, Serialize};

use crate::participant::Participant;
use crate::poker::PokerBoard;
use crate::retro::RetroBoard;
use crate::session::{Session, SessionKind};
use crate::storyboard::StoryboardBoard;

/// Kind-specific board content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "board", rename_all = "lowercase")]
pub enum Board {
    /// Poker plans and voting state.
    Poker(PokerBoard),
    /// Retro items, groups, and actions.
    Retro(RetroBoard),
    /// Storyboard goals.
    Storyboard(StoryboardBoard),
}

impl Board {
    /// Empty board for a new session of `kind`.
    pub fn empty(kind: SessionKind) -> Self {
        match kind {
            SessionKind::Poker => Self::Poker(PokerBoard::default()),
            SessionKind::Retro => Self::Retro(RetroBoard::default()),
            SessionKind::Storyboard => Self::Storyboard(StoryboardBoard::default()),
        }
    }
}

/// Snapshot sent to a connection when it joins or asks to resync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Session record.
    pub session: Session,
    /// Roster.
    pub participants: Vec<Participant>,
    /// Board content.
    pub board: Board,
}
