//! Builder helpers for constructing outbound messages.

use serde::{Deserialize, Serialize};

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::UserId;
use rally_entity::{Participant, SessionState};

use super::types::{OutboundMessage, tags};

/// Payload of an `error` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Taxonomy code (`EINVALID`, `EUNAUTHORIZED`, ...).
    pub code: String,
    /// Machine-readable sub-code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Build a message with a serialized payload.
pub fn build<T: Serialize + ?Sized>(
    kind: &str,
    payload: &T,
    user_id: Option<UserId>,
) -> AppResult<OutboundMessage> {
    Ok(OutboundMessage {
        kind: kind.to_string(),
        value: serde_json::to_string(payload)?,
        user_id,
    })
}

/// Build an `error` message; internal detail is withheld.
pub fn build_error(err: &AppError, user_id: Option<UserId>) -> OutboundMessage {
    let payload = ErrorPayload {
        code: err.kind.wire_code().to_string(),
        reason: err.reason.clone(),
        message: err.public_message().to_string(),
    };
    OutboundMessage {
        kind: tags::ERROR.to_string(),
        value: serde_json::to_string(&payload).unwrap_or_default(),
        user_id,
    }
}

/// Build a roster message (`user_joined`, `user_left`, ...).
pub fn build_roster(
    kind: &str,
    participants: &[Participant],
    user_id: UserId,
) -> AppResult<OutboundMessage> {
    build(kind, participants, Some(user_id))
}

/// Build the private `init` snapshot.
pub fn build_init(state: &SessionState, user_id: UserId) -> AppResult<OutboundMessage> {
    build(tags::INIT, state, Some(user_id))
}
