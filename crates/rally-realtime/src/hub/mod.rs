//! Per-session hub.
//!
//! Each session with at least one live connection is owned by a
//! [`actor::SessionActor`] task that receives [`HubCommand`]s over a
//! bounded mailbox. Registration, unregistration, event handling, and
//! fan-out for one session therefore happen one at a time and in mailbox
//! order, while unrelated sessions proceed independently.
//!
//! The only shared structures are the slot map used to find an actor's
//! mailbox and the `(session, user)` presence index; neither is held
//! across an await.

mod actor;
pub mod command;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::types::{ConnectionId, SessionId, UserId};

use crate::connection::ConnectionHandle;
use crate::message::builder;
use crate::message::types::tags;
use crate::message::{InboundMessage, OutboundMessage};
use crate::metrics::RealtimeMetrics;
use crate::router::EventRouter;

use self::actor::SessionActor;
pub use self::command::HubCommand;

#[derive(Debug, Clone)]
struct SessionSlot {
    tx: mpsc::Sender<HubCommand>,
    actor_id: u64,
}

#[derive(Debug)]
struct HubInner {
    sessions: DashMap<SessionId, SessionSlot>,
    live: DashMap<(SessionId, UserId), ConnectionId>,
    router: EventRouter,
    metrics: Arc<RealtimeMetrics>,
    mailbox_size: usize,
    next_actor: AtomicU64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Deleted {
    session_id: SessionId,
}

/// Registry of session actors. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionHub(Arc<HubInner>);

impl SessionHub {
    /// Creates an empty hub.
    pub fn new(router: EventRouter, metrics: Arc<RealtimeMetrics>, mailbox_size: usize) -> Self {
        Self(Arc::new(HubInner {
            sessions: DashMap::new(),
            live: DashMap::new(),
            router,
            metrics,
            mailbox_size: mailbox_size.max(1),
            next_actor: AtomicU64::new(1),
        }))
    }

    /// Admit a connection. On success the connection has received its
    /// `init` snapshot and the session has been sent the new roster.
    pub async fn register(&self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        let (reply, admitted) = oneshot::channel();
        let session_id = handle.session_id;
        self.submit(session_id, HubCommand::Register { handle, reply }, true)
            .await
            .map_err(|_| AppError::internal("Session hub unavailable"))?;
        admitted
            .await
            .map_err(|_| AppError::internal("Session actor stopped during registration"))?
    }

    /// Remove a connection. A no-op once the session has been shut down.
    pub async fn unregister(&self, session_id: SessionId, conn_id: ConnectionId) {
        let _ = self
            .submit(session_id, HubCommand::Unregister { conn_id }, false)
            .await;
    }

    /// Queue an inbound event. Returns `false` when the session has no actor.
    pub async fn dispatch(
        &self,
        session_id: SessionId,
        conn_id: ConnectionId,
        message: InboundMessage,
    ) -> bool {
        self.submit(session_id, HubCommand::Dispatch { conn_id, message }, false)
            .await
            .is_ok()
    }

    /// Deliver a message to every connection of a session.
    pub async fn broadcast(&self, session_id: SessionId, message: OutboundMessage) -> bool {
        self.submit(session_id, HubCommand::Broadcast { message }, false)
            .await
            .is_ok()
    }

    /// Tell a deleted session's connections and close them.
    pub async fn shutdown_session(&self, session_id: SessionId) {
        let notice = builder::build(tags::SESSION_DELETED, &Deleted { session_id }, None).ok();
        self.stop(session_id, notice).await;
    }

    /// Close every connection of every session.
    pub async fn shutdown_all(&self) {
        let ids: Vec<SessionId> = self.0.sessions.iter().map(|e| *e.key()).collect();
        for session_id in ids {
            self.stop(session_id, None).await;
        }
    }

    /// Whether `user_id` has a live connection to `session_id`.
    pub fn is_connected(&self, session_id: SessionId, user_id: UserId) -> bool {
        self.0.live.contains_key(&(session_id, user_id))
    }

    /// Sessions with a running actor.
    pub fn session_count(&self) -> usize {
        self.0.sessions.len()
    }

    /// Live connections across all sessions.
    pub fn connection_count(&self) -> usize {
        self.0.live.len()
    }

    async fn stop(&self, session_id: SessionId, notice: Option<OutboundMessage>) {
        let (done, stopped) = oneshot::channel();
        if self
            .submit(session_id, HubCommand::Shutdown { notice, done }, false)
            .await
            .is_ok()
        {
            let _ = stopped.await;
        }
    }

    /// Hand `cmd` to the session's actor, spawning one when `create` is set.
    /// Gives the command back when there is no actor to take it.
    async fn submit(
        &self,
        session_id: SessionId,
        mut cmd: HubCommand,
        create: bool,
    ) -> Result<(), HubCommand> {
        loop {
            let existing = self.0.sessions.get(&session_id).map(|s| s.value().clone());
            let slot = match existing {
                Some(slot) => slot,
                None if create => self.spawn_actor(session_id),
                None => return Err(cmd),
            };
            match slot.tx.send(cmd).await {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    self.retire(session_id, slot.actor_id);
                    cmd = returned;
                }
            }
        }
    }

    fn spawn_actor(&self, session_id: SessionId) -> SessionSlot {
        self.0
            .sessions
            .entry(session_id)
            .or_insert_with(|| {
                let (tx, rx) = mpsc::channel(self.0.mailbox_size);
                let actor_id = self.0.next_actor.fetch_add(1, Ordering::Relaxed);
                let actor = SessionActor::new(session_id, actor_id, self.clone());
                tokio::spawn(actor.run(rx));
                SessionSlot { tx, actor_id }
            })
            .value()
            .clone()
    }

    /// Drop the slot of a stopped actor, leaving any successor alone.
    fn retire(&self, session_id: SessionId, actor_id: u64) {
        if self
            .0
            .sessions
            .remove_if(&session_id, |_, slot| slot.actor_id == actor_id)
            .is_some()
        {
            debug!(session_id = %session_id, actor_id, "Session actor retired");
        }
    }
}
