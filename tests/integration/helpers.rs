//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use futures::StreamExt;
use futures::channel::mpsc;
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use rally_api::{AppState, build_app, build_state};
use rally_auth::Identity;
use rally_core::config::AppConfig;
use rally_core::result::AppResult;
use rally_core::types::{SessionId, UserId};
use rally_entity::{Session, SessionKind, SessionSettings, UserRole};
use rally_realtime::message::builder::ErrorPayload;
use rally_realtime::{Frame, InboundMessage, OutboundMessage, RealtimeEngine};
use rally_store::NewSession;

/// How long to wait for an expected message.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to listen before concluding nothing was sent.
pub const QUIET_PERIOD: Duration = Duration::from_millis(150);

/// Test application context
pub struct TestApp {
    /// Shared state, also behind the router
    pub state: AppState,
    /// The Axum router for making test requests
    pub router: Router,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = AppConfig::default();
        let state = build_state(config).await.expect("Failed to build state");
        let router = build_app(state.clone());
        Self { state, router }
    }

    /// The real-time engine.
    pub fn engine(&self) -> &RealtimeEngine {
        &self.state.realtime
    }

    /// A user with a signed token.
    pub fn user(&self, name: &str, role: UserRole) -> (Identity, String) {
        let identity = Identity {
            user_id: UserId::new(),
            name: name.to_string(),
            role,
        };
        let token = self
            .state
            .jwt_encoder
            .issue(identity.user_id, name, role)
            .expect("Failed to issue token");
        (identity, token)
    }

    /// A guest user with a signed token.
    pub fn guest(&self, name: &str) -> (Identity, String) {
        self.user(name, UserRole::Guest)
    }

    /// Create a session owned by `owner`.
    pub async fn create_session(
        &self,
        owner: &Identity,
        kind: SessionKind,
        settings: SessionSettings,
    ) -> Session {
        self.state
            .store
            .create_session(NewSession {
                kind,
                name: format!("{kind} test"),
                created_by: owner.user_id,
                creator_name: owner.name.clone(),
                join_code: None,
                facilitator_code: None,
                settings,
            })
            .await
            .expect("Failed to create session")
    }

    /// Add `who` to the roster.
    pub async fn join(&self, session_id: SessionId, who: &Identity) {
        self.state
            .store
            .add_participant(session_id, who.user_id, &who.name, false)
            .await
            .expect("Failed to join session");
    }

    /// Open an in-process connection; does not wait for `init`.
    pub fn open(&self, session_id: SessionId, who: &Identity) -> Client {
        let (to_server, server_rx) = mpsc::unbounded::<Result<Frame, Infallible>>();
        let (server_tx, from_server) = mpsc::unbounded::<Frame>();
        let engine = self.engine().clone();
        let identity = who.clone();
        let task =
            tokio::spawn(async move { engine.serve(session_id, identity, server_tx, server_rx).await });
        Client {
            user_id: who.user_id,
            to_server: Some(to_server),
            from_server,
            task,
        }
    }

    /// Open an in-process connection and consume its `init` and own `user_joined`.
    pub async fn connect(&self, session_id: SessionId, who: &Identity) -> Client {
        let mut client = self.open(session_id, who);
        client.recv_kind("init").await;
        client.recv_kind("user_joined").await;
        client
    }

    /// Serve the app on an ephemeral port.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        let app = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });
        addr
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if body.is_some() {
            req = req.header("Content-Type", "application/json");
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let body = body
            .map(|b| Body::from(serde_json::to_vec(&b).expect("Failed to serialize body")))
            .unwrap_or_else(Body::empty);
        self.send(req.body(body).expect("Failed to build request"))
            .await
    }

    /// Send a prepared request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

/// In-process peer driving [`RealtimeEngine::serve`] over channels.
pub struct Client {
    /// Connected user.
    pub user_id: UserId,
    to_server: Option<mpsc::UnboundedSender<Result<Frame, Infallible>>>,
    from_server: mpsc::UnboundedReceiver<Frame>,
    task: JoinHandle<AppResult<()>>,
}

impl Client {
    /// Send an event with a JSON payload.
    pub fn send(&self, kind: &str, value: Value) {
        let value = if value.is_null() {
            String::new()
        } else {
            value.to_string()
        };
        let text = serde_json::to_string(&InboundMessage::new(kind, value)).expect("encode");
        self.send_raw(text);
    }

    /// Send an arbitrary text frame.
    pub fn send_raw(&self, text: impl Into<String>) {
        if let Some(tx) = &self.to_server {
            tx.unbounded_send(Ok(Frame::Text(text.into())))
                .expect("Server stopped reading");
        }
    }

    /// Next text message; `None` once the server closes.
    pub async fn next(&mut self) -> Option<OutboundMessage> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.from_server.next())
                .await
                .expect("Timed out waiting for a frame")?;
            match frame {
                Frame::Text(text) => {
                    return Some(serde_json::from_str(&text).expect("Malformed outbound message"));
                }
                Frame::Close => return None,
                Frame::Ping(_) | Frame::Pong(_) => continue,
            }
        }
    }

    /// Next text message, which must exist.
    pub async fn recv(&mut self) -> OutboundMessage {
        self.next().await.expect("Connection closed")
    }

    /// Skip ahead to the first message of `kind`.
    pub async fn recv_kind(&mut self, kind: &str) -> OutboundMessage {
        loop {
            let msg = self.recv().await;
            if msg.kind == kind {
                return msg;
            }
        }
    }

    /// Next message, which must be an error; returns its payload.
    pub async fn recv_error(&mut self) -> ErrorPayload {
        let msg = self.recv().await;
        assert_eq!(msg.kind, "error", "expected an error, got {msg:?}");
        msg.payload().expect("Malformed error payload")
    }

    /// Assert that no text message arrives for a short while.
    pub async fn assert_quiet(&mut self) {
        let deadline = tokio::time::Instant::now() + QUIET_PERIOD;
        loop {
            match tokio::time::timeout_at(deadline, self.from_server.next()).await {
                Err(_) => return,
                Ok(Some(Frame::Ping(_) | Frame::Pong(_))) => continue,
                Ok(other) => panic!("expected silence, got {other:?}"),
            }
        }
    }

    /// Wait for the server to close the connection, skipping text messages.
    pub async fn wait_closed(&mut self) {
        while self.next().await.is_some() {}
    }

    /// Hang up and wait for the server side to finish.
    pub async fn disconnect(mut self) -> AppResult<()> {
        self.to_server.take();
        tokio::time::timeout(RECV_TIMEOUT, self.task)
            .await
            .expect("Server did not finish")
            .expect("Serve task panicked")
    }

    /// Result of the server side, once it has finished on its own.
    pub async fn outcome(self) -> AppResult<()> {
        tokio::time::timeout(RECV_TIMEOUT, self.task)
            .await
            .expect("Server did not finish")
            .expect("Serve task panicked")
    }
}

/// Decode a message payload as JSON.
pub fn payload(msg: &OutboundMessage) -> Value {
    msg.payload().expect("Malformed payload")
}
