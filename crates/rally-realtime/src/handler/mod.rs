//! Event handlers.
//!
//! A handler validates domain rules, calls the persistence collaborator,
//! and describes what should happen next as an [`Outcome`]. It never
//! touches connections itself; the session actor applies the outcome, so
//! an error can never leave a partial broadcast behind.

pub mod common;
pub mod poker;
pub mod retro;
pub mod storyboard;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use rally_entity::{Board, SessionState};
use rally_store::Store;

use crate::message::OutboundMessage;
use crate::notification::CompletionNotifier;
use crate::permission::PermissionGuard;

/// Collaborators available to every handler.
#[derive(Clone)]
pub struct HandlerContext {
    /// Persistence collaborator.
    pub store: Arc<dyn Store>,
    /// Facilitator checks.
    pub guard: PermissionGuard,
    /// Completion mail trigger.
    pub notifier: CompletionNotifier,
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("notifier", &self.notifier)
            .finish()
    }
}

/// What the actor should do with the sender's connection afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Effect {
    /// Keep the connection.
    #[default]
    None,
    /// Close the sender's connection after the reply is delivered.
    CloseSender,
    /// Close every connection of the session and stop its actor.
    EndSession,
}

/// Result of a successful handler call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Messages fanned out to every connection, in order.
    pub broadcasts: Vec<OutboundMessage>,
    /// Message for the sender only.
    pub reply: Option<OutboundMessage>,
    /// Follow-up on the connection set.
    pub effect: Effect,
}

impl Outcome {
    /// Silent acknowledgement.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Broadcast a single message.
    pub fn broadcast(message: OutboundMessage) -> Self {
        Self::silent().and_broadcast(message)
    }

    /// Reply to the sender only.
    pub fn reply(message: OutboundMessage) -> Self {
        Self {
            reply: Some(message),
            ..Self::default()
        }
    }

    /// Append a broadcast.
    pub fn and_broadcast(mut self, message: OutboundMessage) -> Self {
        self.broadcasts.push(message);
        self
    }

    /// Set the private reply.
    pub fn with_reply(mut self, message: OutboundMessage) -> Self {
        self.reply = Some(message);
        self
    }

    /// Set the follow-up effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

/// Snapshot as shown to clients, with hidden vote values stripped.
pub fn present_state(mut state: SessionState) -> SessionState {
    if let Board::Poker(board) = &state.board {
        let board = poker::present_board(&state.session.settings, board);
        state.board = Board::Poker(board);
    }
    state
}
