//! Commands accepted by a session actor.

use std::sync::Arc;

use tokio::sync::oneshot;

use rally_core::result::AppResult;
use rally_core::types::ConnectionId;

use crate::connection::ConnectionHandle;
use crate::message::{InboundMessage, OutboundMessage};

/// One unit of work for a session actor. Commands for a session are
/// processed strictly in mailbox order.
#[derive(Debug)]
pub enum HubCommand {
    /// Add a connection; the reply carries the admission result.
    Register {
        /// Connection to add.
        handle: Arc<ConnectionHandle>,
        /// Admission result.
        reply: oneshot::Sender<AppResult<()>>,
    },
    /// Remove a connection.
    Unregister {
        /// Connection to remove.
        conn_id: ConnectionId,
    },
    /// Route an inbound event from a registered connection.
    Dispatch {
        /// Sending connection.
        conn_id: ConnectionId,
        /// Decoded event.
        message: InboundMessage,
    },
    /// Fan a message out to every connection.
    Broadcast {
        /// Message to deliver.
        message: OutboundMessage,
    },
    /// Close every connection and stop the actor.
    Shutdown {
        /// Sent to every connection before closing.
        notice: Option<OutboundMessage>,
        /// Signalled once the connections are closed.
        done: oneshot::Sender<()>,
    },
}
