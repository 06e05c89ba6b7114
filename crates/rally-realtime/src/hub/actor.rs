//! Session actor: the single owner of one session's connection set.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use rally_core::error::{AppError, reason};
use rally_core::result::AppResult;
use rally_core::types::{ConnectionId, SessionId, UserId};
use rally_entity::Participant;

use super::SessionHub;
use super::command::HubCommand;
use crate::connection::{ConnectionHandle, Delivery};
use crate::handler::{Effect, Outcome, present_state};
use crate::message::builder::{build_error, build_init, build_roster};
use crate::message::types::tags;
use crate::message::{InboundMessage, OutboundMessage};

/// Whether the actor keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct SessionActor {
    session_id: SessionId,
    actor_id: u64,
    hub: SessionHub,
    connections: HashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl SessionActor {
    pub(crate) fn new(session_id: SessionId, actor_id: u64, hub: SessionHub) -> Self {
        Self {
            session_id,
            actor_id,
            hub,
            connections: HashMap::new(),
        }
    }

    /// Process commands until the session is stopped or no connection is
    /// left. Commands that raced the exit are handed to a successor.
    pub(crate) async fn run(mut self, mut rx: mpsc::Receiver<HubCommand>) {
        debug!(session_id = %self.session_id, actor_id = self.actor_id, "Session actor started");

        while let Some(cmd) = rx.recv().await {
            let flow = self.handle(cmd).await;
            if flow == Flow::Stop || self.connections.is_empty() {
                break;
            }
        }

        self.hub.retire(self.session_id, self.actor_id);
        rx.close();
        let mut leftovers = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            leftovers.push(cmd);
        }
        for cmd in leftovers {
            match cmd {
                HubCommand::Register { .. } => {
                    let _ = self.hub.submit(self.session_id, cmd, true).await;
                }
                HubCommand::Shutdown { done, .. } => {
                    let _ = done.send(());
                }
                HubCommand::Unregister { .. }
                | HubCommand::Dispatch { .. }
                | HubCommand::Broadcast { .. } => {}
            }
        }

        debug!(session_id = %self.session_id, actor_id = self.actor_id, "Session actor stopped");
    }

    async fn handle(&mut self, cmd: HubCommand) -> Flow {
        match cmd {
            HubCommand::Register { handle, reply } => {
                let result = self.register(handle).await;
                let _ = reply.send(result);
                Flow::Continue
            }
            HubCommand::Unregister { conn_id } => {
                self.unregister(conn_id).await;
                Flow::Continue
            }
            HubCommand::Dispatch { conn_id, message } => self.dispatch(conn_id, message).await,
            HubCommand::Broadcast { message } => {
                self.broadcast(&message);
                Flow::Continue
            }
            HubCommand::Shutdown { notice, done } => {
                if let Some(notice) = notice {
                    self.broadcast(&notice);
                }
                self.close_all();
                info!(session_id = %self.session_id, "Session shut down");
                let _ = done.send(());
                Flow::Stop
            }
        }
    }

    async fn register(&mut self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        let user_id = handle.user_id();
        if self
            .connections
            .values()
            .any(|c| c.user_id() == user_id && !c.is_closed())
        {
            return Err(AppError::conflict("Already connected to this session")
                .with_reason(reason::DUPLICATE_CONNECTION));
        }

        let store = &self.hub.0.router.context().store;
        let participant = store
            .get_participant(self.session_id, user_id)
            .await?
            .ok_or_else(|| AppError::authorization("Join the session before connecting"))?;
        if participant.abandoned {
            return Err(
                AppError::authorization("You left this session").with_reason(reason::ABANDONED)
            );
        }

        let roster = store
            .set_participant_active(self.session_id, user_id, true)
            .await?;
        let state = match store.session_state(self.session_id).await {
            Ok(state) => present_state(state),
            Err(e) => {
                self.mark_inactive(user_id).await;
                return Err(e);
            }
        };
        let init = build_init(&state, user_id)?;
        let joined = build_roster(tags::USER_JOINED, &roster, user_id)?;

        self.connections.insert(handle.id, Arc::clone(&handle));
        self.hub.0.live.insert((self.session_id, user_id), handle.id);
        self.deliver(&handle, init);
        self.broadcast(&joined);

        info!(
            session_id = %self.session_id,
            conn_id = %handle.id,
            user_id = %user_id,
            connections = self.connections.len(),
            "Participant connected"
        );
        Ok(())
    }

    async fn unregister(&mut self, conn_id: ConnectionId) {
        let Some(handle) = self.connections.remove(&conn_id) else {
            return;
        };
        handle.close();
        let user_id = handle.user_id();
        self.hub
            .0
            .live
            .remove_if(&(self.session_id, user_id), |_, c| *c == conn_id);

        if self.connections.values().any(|c| c.user_id() == user_id) {
            return;
        }
        if let Some(roster) = self.mark_inactive(user_id).await {
            match build_roster(tags::USER_LEFT, &roster, user_id) {
                Ok(left) => self.broadcast(&left),
                Err(e) => warn!(session_id = %self.session_id, error = %e, "Failed to build roster"),
            }
        }
        info!(
            session_id = %self.session_id,
            conn_id = %conn_id,
            user_id = %user_id,
            "Participant disconnected"
        );
    }

    async fn dispatch(&mut self, conn_id: ConnectionId, message: InboundMessage) -> Flow {
        let Some(handle) = self.connections.get(&conn_id).cloned() else {
            debug!(conn_id = %conn_id, "Dropping event from unregistered connection");
            return Flow::Continue;
        };
        if handle.is_closed() {
            debug!(
                conn_id = %conn_id,
                event_type = %message.kind,
                "Dropping event from closed connection"
            );
            return Flow::Continue;
        }

        let router = self.hub.0.router.clone();
        match router.route(self.session_id, &handle.identity, &message).await {
            Ok(outcome) => self.apply(&handle, outcome),
            Err(e) => {
                if e.kind.is_client_facing() {
                    debug!(
                        session_id = %self.session_id,
                        user_id = %handle.user_id(),
                        event_type = %message.kind,
                        error = %e,
                        "Event rejected"
                    );
                } else {
                    error!(
                        session_id = %self.session_id,
                        user_id = %handle.user_id(),
                        event_type = %message.kind,
                        error = %e,
                        "Event handler failed"
                    );
                }
                self.hub.0.metrics.handler_error();
                self.deliver(&handle, build_error(&e, Some(handle.user_id())));
                Flow::Continue
            }
        }
    }

    fn apply(&mut self, sender: &Arc<ConnectionHandle>, outcome: Outcome) -> Flow {
        for message in &outcome.broadcasts {
            self.broadcast(message);
        }
        if let Some(reply) = outcome.reply {
            self.deliver(sender, reply);
        }
        match outcome.effect {
            Effect::None => Flow::Continue,
            Effect::CloseSender => {
                sender.close();
                Flow::Continue
            }
            Effect::EndSession => {
                self.close_all();
                info!(session_id = %self.session_id, "Session ended");
                Flow::Stop
            }
        }
    }

    async fn mark_inactive(&self, user_id: UserId) -> Option<Vec<Participant>> {
        let store = &self.hub.0.router.context().store;
        match store
            .set_participant_active(self.session_id, user_id, false)
            .await
        {
            Ok(roster) => Some(roster),
            Err(e) => {
                debug!(
                    session_id = %self.session_id,
                    user_id = %user_id,
                    error = %e,
                    "Could not mark participant inactive"
                );
                None
            }
        }
    }

    fn deliver(&self, handle: &ConnectionHandle, message: OutboundMessage) {
        if handle.send(message) == Delivery::Dropped {
            self.hub.0.metrics.message_dropped();
        }
    }

    fn broadcast(&self, message: &OutboundMessage) {
        for handle in self.connections.values() {
            self.deliver(handle, message.clone());
        }
    }

    fn close_all(&mut self) {
        for (conn_id, handle) in self.connections.drain() {
            handle.close();
            self.hub
                .0
                .live
                .remove_if(&(self.session_id, handle.user_id()), |_, c| *c == conn_id);
        }
    }
}
