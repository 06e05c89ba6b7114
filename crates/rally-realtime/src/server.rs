//! Top-level real-time engine that ties the subsystems together.

use std::fmt;
use std::sync::Arc;

use futures::{Sink, SinkExt, Stream};
use serde::Serialize;
use tokio::time;
use tracing::{info, warn};

use rally_auth::{Authenticator, Identity};
use rally_core::config::RealtimeConfig;
use rally_core::result::AppResult;
use rally_core::traits::Mailer;
use rally_core::types::{SessionId, UserId};
use rally_store::Store;

use crate::connection::{ConnectionHandle, Frame, socket};
use crate::handler::HandlerContext;
use crate::hub::SessionHub;
use crate::message::builder::build_error;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::notification::CompletionNotifier;
use crate::permission::PermissionGuard;
use crate::router::EventRouter;

/// Engine counters plus live registry sizes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    /// Sessions with a running actor.
    pub sessions: usize,
    /// Live connections.
    pub connections: usize,
    /// Cumulative counters.
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

/// Central real-time engine.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Session registry.
    pub hub: SessionHub,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("sessions", &self.hub.session_count())
            .field("connections", &self.hub.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new engine over its collaborators.
    pub fn new(
        config: RealtimeConfig,
        store: Arc<dyn Store>,
        auth: Arc<dyn Authenticator>,
        mailer: Arc<dyn Mailer>,
        completion_emails: bool,
    ) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let router = EventRouter::new(HandlerContext {
            store,
            guard: PermissionGuard::new(auth),
            notifier: CompletionNotifier::new(mailer, completion_emails),
        });
        let hub = SessionHub::new(router, Arc::clone(&metrics), config.session_mailbox_size);

        info!("Real-time engine initialized");
        Self {
            hub,
            metrics,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Run one connection to completion.
    ///
    /// Registers with the session's hub, then runs the read loop on the
    /// calling task and the write loop on a spawned one. A rejected
    /// registration is reported to the peer as an error frame followed by
    /// a close, and returned to the caller.
    pub async fn serve<K, S, E>(
        &self,
        session_id: SessionId,
        identity: Identity,
        sink: K,
        stream: S,
    ) -> AppResult<()>
    where
        K: Sink<Frame> + Send + 'static,
        K::Error: fmt::Display,
        S: Stream<Item = Result<Frame, E>> + Send + 'static,
        E: fmt::Display + Send,
    {
        let user_id = identity.user_id;
        let (handle, rx) = ConnectionHandle::new(session_id, identity, &self.config);
        let mut sink = Box::pin(sink);
        let stream = Box::pin(stream);

        if let Err(e) = self.hub.register(Arc::clone(&handle)).await {
            self.metrics.connection_rejected();
            info!(
                session_id = %session_id,
                user_id = %user_id,
                error = %e,
                "Connection rejected"
            );
            let wait = self.config.write_wait();
            let frame = Frame::Text(build_error(&e, Some(user_id)).to_json());
            let _ = time::timeout(wait, sink.send(frame)).await;
            let _ = time::timeout(wait, sink.send(Frame::Close)).await;
            return Err(e);
        }

        self.metrics.connection_opened();
        info!(
            conn_id = %handle.id,
            session_id = %session_id,
            user_id = %user_id,
            "WebSocket connection established"
        );

        let writer = tokio::spawn(socket::write_loop(
            Arc::clone(&handle),
            sink,
            rx,
            self.config.clone(),
            Arc::clone(&self.metrics),
        ));
        socket::read_loop(
            Arc::clone(&handle),
            stream,
            self.hub.clone(),
            &self.config,
            &self.metrics,
        )
        .await;

        handle.close();
        self.hub.unregister(session_id, handle.id).await;
        if let Err(e) = writer.await {
            warn!(conn_id = %handle.id, error = %e, "Write loop task failed");
        }
        self.metrics.connection_closed();
        info!(
            conn_id = %handle.id,
            session_id = %session_id,
            user_id = %user_id,
            "WebSocket connection closed"
        );
        Ok(())
    }

    /// Close a deleted session's connections.
    pub async fn shutdown_session(&self, session_id: SessionId) {
        self.hub.shutdown_session(session_id).await;
    }

    /// Whether the user currently has a live connection to the session.
    pub fn is_connected(&self, session_id: SessionId, user_id: UserId) -> bool {
        self.hub.is_connected(session_id, user_id)
    }

    /// Counters for the health endpoint.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            sessions: self.hub.session_count(),
            connections: self.hub.connection_count(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Close every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.hub.shutdown_all().await;
        info!("Real-time engine shut down");
    }
}
