//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use rally_entity::{SessionKind, SessionSettings};

/// Guest sign-in body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GuestRequest {
    /// Display name.
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,
}

/// Session creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Room kind.
    pub kind: SessionKind,
    /// Display name.
    #[validate(length(min = 1, max = 256, message = "Session name must be 1-256 characters"))]
    pub name: String,
    /// Code participants must present to join.
    #[validate(length(max = 64))]
    pub join_code: Option<String>,
    /// Code that lets a participant promote themselves.
    #[validate(length(max = 64))]
    pub facilitator_code: Option<String>,
    /// Behaviour switches; defaults when omitted.
    #[serde(default)]
    pub settings: Option<SessionSettings>,
}

/// Join body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    /// Join code, when the session has one.
    #[serde(default)]
    pub join_code: Option<String>,
    /// Join as an observer who does not vote.
    #[serde(default)]
    pub spectator: bool,
}

/// Alert creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAlertRequest {
    /// Short title.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Body.
    #[validate(length(min = 1, max = 4096))]
    pub content: String,
    /// Severity.
    #[serde(default = "default_level")]
    pub level: String,
    /// Users may close it.
    #[serde(default)]
    pub dismissible: bool,
}

fn default_level() -> String {
    "info".to_string()
}
