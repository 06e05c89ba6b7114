//! Session record as returned by the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rally_core::types::{SessionId, UserId};

use super::kind::SessionKind;
use super::phase::Phase;

/// Per-session behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Poker: hide vote values while voting is open.
    #[serde(default)]
    pub hide_voter_identity: bool,
    /// Poker: end voting automatically once every eligible participant voted.
    #[serde(default)]
    pub auto_finish_voting: bool,
    /// Poker: allowed estimate values.
    #[serde(default = "default_point_values")]
    pub point_values: Vec<String>,
    /// Retro: group votes each participant may cast.
    #[serde(default = "default_max_votes")]
    pub max_votes: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            hide_voter_identity: false,
            auto_finish_voting: false,
            point_values: default_point_values(),
            max_votes: default_max_votes(),
        }
    }
}

fn default_point_values() -> Vec<String> {
    ["0", "1/2", "1", "2", "3", "5", "8", "13", "?"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_votes() -> u32 {
    3
}

/// One collaborative room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID.
    pub id: SessionId,
    /// Room kind.
    pub kind: SessionKind,
    /// Display name.
    pub name: String,
    /// Current phase.
    pub phase: Phase,
    /// Ordered facilitator user IDs; never empty while the session exists.
    pub facilitators: Vec<UserId>,
    /// Creator of the session.
    pub created_by: UserId,
    /// Entry is gated by a join code.
    pub has_join_code: bool,
    /// Self-promotion to facilitator is possible with a code.
    pub has_facilitator_code: bool,
    /// Behaviour switches.
    pub settings: SessionSettings,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Whether the user is in the facilitator set.
    pub fn is_facilitator(&self, user_id: UserId) -> bool {
        self.facilitators.contains(&user_id)
    }

    /// Whether the session reached its terminal phase.
    pub fn is_completed(&self) -> bool {
        self.phase.is_terminal()
    }
}
