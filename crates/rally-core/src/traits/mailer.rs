//! Email collaborator contract.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::SessionId;

/// Outbound email delivery.
///
/// Callers treat delivery as fire-and-forget: failures are logged by the
/// caller and never retried or surfaced to session participants.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send the end-of-session summary to the session's facilitators.
    async fn send_session_completed_summary(&self, session_id: SessionId) -> AppResult<()>;
}
