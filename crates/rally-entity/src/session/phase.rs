//! Named session phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named phase. Which phases are legal, and in what order, depends on
/// the session kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Poker: participants gather, plans are prepared.
    Lobby,
    /// Poker: plans are being estimated.
    Voting,
    /// Retro: facilitator sets the stage.
    Intro,
    /// Retro: participants add items.
    Brainstorm,
    /// Retro: items are clustered into groups.
    Group,
    /// Retro: participants vote on groups.
    Vote,
    /// Retro: action items are agreed.
    Action,
    /// Storyboard: the map is being edited.
    Mapping,
    /// Terminal for every kind.
    Completed,
}

impl Phase {
    /// Return the phase as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Voting => "voting",
            Self::Intro => "intro",
            Self::Brainstorm => "brainstorm",
            Self::Group => "group",
            Self::Vote => "vote",
            Self::Action => "action",
            Self::Mapping => "mapping",
            Self::Completed => "completed",
        }
    }

    /// No mutating event is accepted once a session is here.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = rally_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lobby" => Ok(Self::Lobby),
            "voting" => Ok(Self::Voting),
            "intro" => Ok(Self::Intro),
            "brainstorm" => Ok(Self::Brainstorm),
            "group" => Ok(Self::Group),
            "vote" => Ok(Self::Vote),
            "action" => Ok(Self::Action),
            "mapping" => Ok(Self::Mapping),
            "completed" => Ok(Self::Completed),
            _ => Err(rally_core::AppError::validation(format!(
                "Unknown phase: '{s}'"
            ))),
        }
    }
}
