//! Session kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::phase::Phase;
use std::str::FromStr;

/// The three kinds of collaborative room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Planning-poker battle.
    Poker,
    /// Retrospective.
    Retro,
    /// Story-mapping board.
    Storyboard,
}

impl SessionKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poker => "poker",
            Self::Retro => "retro",
            Self::Storyboard => "storyboard",
        }
    }

    /// Noun used in kind-specific event tags (`concede_battle`, `abandon_retro`).
    pub fn event_noun(&self) -> &'static str {
        match self {
            Self::Poker => "battle",
            Self::Retro => "retro",
            Self::Storyboard => "storyboard",
        }
    }

    /// Ordered phase plan, ending in [`Phase::Completed`].
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            Self::Poker => &[Phase::Lobby, Phase::Voting, Phase::Completed],
            Self::Retro => &[
                Phase::Intro,
                Phase::Brainstorm,
                Phase::Group,
                Phase::Vote,
                Phase::Action,
                Phase::Completed,
            ],
            Self::Storyboard => &[Phase::Mapping, Phase::Completed],
        }
    }

    /// Phase a new session starts in.
    pub fn initial_phase(&self) -> Phase {
        self.phases()[0]
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = rally_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poker" | "battle" => Ok(Self::Poker),
            "retro" => Ok(Self::Retro),
            "storyboard" => Ok(Self::Storyboard),
            _ => Err(rally_core::AppError::validation(format!(
                "Invalid session kind: '{s}'"
            ))),
        }
    }
}
