//! Mail collaborator that writes summaries to the log.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use rally_core::config::notification::NotificationConfig;
use rally_core::result::AppResult;
use rally_core::traits::Mailer;
use rally_core::types::SessionId;
use rally_entity::Board;

use crate::traits::SessionStore;

/// Renders a completion summary and logs it instead of sending mail.
pub struct LogMailer {
    store: Arc<dyn SessionStore>,
    sender: String,
}

impl LogMailer {
    /// Create a mailer reading session state from `store`.
    pub fn new(store: Arc<dyn SessionStore>, config: &NotificationConfig) -> Self {
        Self {
            store,
            sender: config.sender.clone(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_session_completed_summary(&self, session_id: SessionId) -> AppResult<()> {
        let state = self.store.session_state(session_id).await?;
        let recipients = state.participants.iter().filter(|p| !p.abandoned).count();
        let items = match &state.board {
            Board::Poker(board) => board.plans.iter().filter(|p| p.points.is_some()).count(),
            Board::Retro(board) => board.actions.len(),
            Board::Storyboard(board) => board
                .goals
                .iter()
                .flat_map(|g| g.columns.iter())
                .map(|c| c.stories.len())
                .sum(),
        };

        info!(
            session_id = %session_id,
            kind = %state.session.kind,
            sender = %self.sender,
            recipients,
            items,
            "Session summary mailed"
        );
        Ok(())
    }
}
