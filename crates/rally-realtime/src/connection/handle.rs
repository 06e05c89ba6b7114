//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use rally_auth::Identity;
use rally_core::config::RealtimeConfig;
use rally_core::types::{ConnectionId, SessionId, UserId};

use crate::message::OutboundMessage;

/// Result of queueing a message on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the write loop.
    Queued,
    /// Dropped because the outbound queue was full.
    Dropped,
    /// The connection is closed.
    Closed,
}

/// A handle to a single live connection bound to one (session, user) pair.
///
/// The hub pushes messages through [`ConnectionHandle::send`], which never
/// waits: a slow consumer fills its own bounded queue and is closed after
/// `max_write_timeouts` consecutive overflows, so it cannot hold up
/// delivery to the rest of the session.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Session this connection belongs to.
    pub session_id: SessionId,
    /// Resolved caller.
    pub identity: Identity,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundMessage>,
    full_strikes: AtomicU32,
    max_full_strikes: u32,
    unanswered_pings: AtomicU32,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end of its outbound queue.
    pub fn new(
        session_id: SessionId,
        identity: Identity,
        config: &RealtimeConfig,
    ) -> (Arc<Self>, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(config.outbound_buffer_size);
        let handle = Arc::new(Self {
            id: ConnectionId::new(),
            session_id,
            identity,
            connected_at: Utc::now(),
            sender,
            full_strikes: AtomicU32::new(0),
            max_full_strikes: config.max_write_timeouts.max(1),
            unanswered_pings: AtomicU32::new(0),
            closed: CancellationToken::new(),
        });
        (handle, receiver)
    }

    /// Owner of the connection.
    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    /// Queue a message without waiting.
    pub fn send(&self, msg: OutboundMessage) -> Delivery {
        if self.is_closed() {
            return Delivery::Closed;
        }
        match self.sender.try_send(msg) {
            Ok(()) => {
                self.full_strikes.store(0, Ordering::Relaxed);
                Delivery::Queued
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                let strikes = self.full_strikes.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    conn_id = %self.id,
                    user_id = %self.user_id(),
                    strikes,
                    "Outbound queue full, dropping message"
                );
                if strikes >= self.max_full_strikes {
                    warn!(conn_id = %self.id, "Closing slow consumer");
                    self.close();
                }
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                Delivery::Closed
            }
        }
    }

    /// Ask both loops to stop. Queued messages are still flushed.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether the connection has been asked to stop.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Token cancelled by [`ConnectionHandle::close`].
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Record a ping; returns the number of pings now awaiting a pong.
    pub fn ping_sent(&self) -> u32 {
        self.unanswered_pings.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a pong.
    pub fn pong_received(&self) {
        self.unanswered_pings.store(0, Ordering::Relaxed);
    }

    /// Pings sent since the last pong.
    pub fn unanswered_pings(&self) -> u32 {
        self.unanswered_pings.load(Ordering::Relaxed)
    }
}
