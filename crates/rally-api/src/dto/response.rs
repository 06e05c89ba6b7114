//! Response DTOs.

use serde::{Deserialize, Serialize};

use rally_core::types::UserId;
use rally_entity::{Participant, Session, UserRole};
use rally_realtime::EngineStats;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Caller summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Application role.
    pub role: UserRole,
}

/// Guest sign-in result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestResponse {
    /// Session token.
    pub token: String,
    /// The new guest.
    pub user: UserResponse,
}

/// Join result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Joined session.
    pub session: Session,
    /// Roster after joining.
    pub participants: Vec<Participant>,
}

/// Health check body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Engine counters.
    pub realtime: EngineStats,
}
