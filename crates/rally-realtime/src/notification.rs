//! Fire-and-forget completion summaries.

use std::sync::Arc;

use tracing::{debug, warn};

use rally_core::traits::Mailer;
use rally_core::types::SessionId;

/// Hands completed sessions to the mail collaborator without blocking
/// the session actor.
#[derive(Clone)]
pub struct CompletionNotifier {
    mailer: Arc<dyn Mailer>,
    enabled: bool,
}

impl std::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionNotifier")
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl CompletionNotifier {
    /// Creates a notifier; when `enabled` is false nothing is sent.
    pub fn new(mailer: Arc<dyn Mailer>, enabled: bool) -> Self {
        Self { mailer, enabled }
    }

    /// Spawn the summary send. Failures are logged and not retried.
    pub fn session_completed(&self, session_id: SessionId) {
        if !self.enabled {
            debug!(session_id = %session_id, "Completion emails disabled");
            return;
        }
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            if let Err(e) = mailer.send_session_completed_summary(session_id).await {
                warn!(session_id = %session_id, error = %e, "Failed to send completion summary");
            }
        });
    }
}
