//! Typed inbound events.
//!
//! Every session kind has its own closed event enum; parsing a tag that is
//! not part of the kind's catalogue fails with `UNKNOWN_EVENT`, so an event
//! legal for retros is rejected on a poker connection. Permission class and
//! phase gates are exhaustive matches over the enums.

pub mod common;
pub mod poker;
pub mod retro;
pub mod storyboard;

use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_entity::{Phase, SessionKind};

use crate::permission::Access;

pub use common::CommonEvent;
pub use poker::PokerEvent;
pub use retro::RetroEvent;
pub use storyboard::StoryboardEvent;

/// A parsed event for one of the three session kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Planning-poker event.
    Poker(PokerEvent),
    /// Retrospective event.
    Retro(RetroEvent),
    /// Storyboard event.
    Storyboard(StoryboardEvent),
}

impl SessionEvent {
    /// Parse `tag` and its payload against the catalogue of `kind`.
    pub fn parse(kind: SessionKind, tag: &str, value: &str) -> AppResult<Self> {
        Ok(match kind {
            SessionKind::Poker => Self::Poker(PokerEvent::parse(tag, value)?),
            SessionKind::Retro => Self::Retro(RetroEvent::parse(tag, value)?),
            SessionKind::Storyboard => Self::Storyboard(StoryboardEvent::parse(tag, value)?),
        })
    }

    /// Permission class.
    pub fn access(&self) -> Access {
        match self {
            Self::Poker(e) => e.access(),
            Self::Retro(e) => e.access(),
            Self::Storyboard(e) => e.access(),
        }
    }

    /// Phases the event is accepted in; `None` means any open phase.
    pub fn phases(&self) -> Option<&'static [Phase]> {
        match self {
            Self::Poker(e) => e.phases(),
            Self::Retro(e) => e.phases(),
            Self::Storyboard(e) => e.phases(),
        }
    }

    /// Whether the event may be sent once the session is completed.
    pub fn allowed_when_completed(&self) -> bool {
        let common = match self {
            Self::Poker(PokerEvent::Common(c))
            | Self::Retro(RetroEvent::Common(c))
            | Self::Storyboard(StoryboardEvent::Common(c)) => c,
            _ => return false,
        };
        common.allowed_when_completed()
    }
}

/// Error for a tag outside the catalogue of `kind`.
pub(crate) fn unknown_event(kind: SessionKind, tag: &str) -> AppError {
    AppError::validation(format!("Unknown event type '{tag}' for {kind} sessions"))
        .with_reason(reason::UNKNOWN_EVENT)
}
