//! Inbound and outbound WebSocket message definitions.
//!
//! Both directions share one envelope: `type` selects the event, `value`
//! carries a JSON-encoded payload as a string, and `userId` names the
//! user the message originates from.

use serde::{Deserialize, Serialize};

use rally_core::types::UserId;

/// Event sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Event type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON-encoded payload; may be empty for events without one.
    #[serde(default)]
    pub value: String,
    /// Ignored on input; the server uses the authenticated user.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl InboundMessage {
    /// Build an inbound message.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            user_id: None,
        }
    }
}

/// Message sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Event type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON-encoded payload.
    pub value: String,
    /// User whose action produced the message.
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl OutboundMessage {
    /// Encode as a text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode the payload.
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.value)
    }
}

/// Outbound event tags emitted by the engine itself.
pub mod tags {
    /// Private error reply.
    pub const ERROR: &str = "error";
    /// Private full-state snapshot.
    pub const INIT: &str = "init";
    /// Roster after a connection registered.
    pub const USER_JOINED: &str = "user_joined";
    /// Roster after a user's last connection left.
    pub const USER_LEFT: &str = "user_left";
    /// Roster after a user left permanently.
    pub const USER_ABANDONED: &str = "user_abandoned";
    /// Session deleted out from under its connections.
    pub const SESSION_DELETED: &str = "session_deleted";
    /// Session deleted by its facilitator.
    pub const SESSION_CONCEDED: &str = "session_conceded";
    /// Phase moved forward.
    pub const PHASE_CHANGED: &str = "phase_changed";
    /// Facilitator set changed.
    pub const FACILITATORS_UPDATED: &str = "facilitators_updated";

    /// Poker: a vote was cast.
    pub const VOTE_ACTIVITY: &str = "vote_activity";
    /// Poker: a vote was withdrawn.
    pub const VOTE_RETRACTED: &str = "vote_retracted";
    /// Poker: voting locked on the active plan.
    pub const VOTING_ENDED: &str = "voting_ended";
    /// Poker: plan appended.
    pub const PLAN_ADDED: &str = "plan_added";
    /// Poker: plan edited.
    pub const PLAN_REVISED: &str = "plan_revised";
    /// Poker: plan deleted.
    pub const PLAN_BURNED: &str = "plan_burned";
    /// Poker: voting opened on a plan.
    pub const PLAN_ACTIVATED: &str = "plan_activated";
    /// Poker: plan skipped.
    pub const PLAN_SKIPPED: &str = "plan_skipped";
    /// Poker: estimate recorded.
    pub const PLAN_FINALIZED: &str = "plan_finalized";
    /// Poker: a participant toggled spectator mode.
    pub const SPECTATOR_TOGGLED: &str = "spectator_toggled";
    /// Poker: nudge.
    pub const JAB_WARRIOR: &str = "jab_warrior";

    /// Retro: items or groups changed.
    pub const ITEMS_UPDATED: &str = "items_updated";
    /// Retro: group votes changed.
    pub const VOTES_UPDATED: &str = "votes_updated";
    /// Retro: action items changed.
    pub const ACTIONS_UPDATED: &str = "actions_updated";
    /// Retro: ready markers changed.
    pub const READY_UPDATED: &str = "ready_updated";

    /// Storyboard: goals, columns, or stories changed.
    pub const GOALS_UPDATED: &str = "goals_updated";
}
