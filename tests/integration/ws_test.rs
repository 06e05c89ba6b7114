//! Integration tests for WebSocket upgrades over a real socket.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use helpers::TestApp;
use rally_core::types::SessionId;
use rally_entity::{SessionKind, SessionSettings};
use rally_realtime::OutboundMessage;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn url(addr: SocketAddr, kind: &str, session_id: SessionId) -> String {
    format!("ws://{addr}/api/ws/{kind}/{session_id}")
}

async fn connect(addr: SocketAddr, kind: &str, session_id: SessionId, token: &str) -> Socket {
    let (socket, _) = connect_async(format!("{}?token={token}", url(addr, kind, session_id)))
        .await
        .expect("WebSocket handshake failed");
    socket
}

async fn refused(addr: SocketAddr, kind: &str, session_id: SessionId, token: &str) -> StatusCode {
    match connect_async(format!("{}?token={token}", url(addr, kind, session_id))).await {
        Err(WsError::Http(response)) => {
            StatusCode::from_u16(response.status().as_u16()).expect("status")
        }
        Err(e) => panic!("unexpected handshake error: {e}"),
        Ok(_) => panic!("handshake unexpectedly succeeded"),
    }
}

async fn recv_kind(socket: &mut Socket, kind: &str) -> OutboundMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = frame {
            let msg: OutboundMessage = serde_json::from_str(text.as_str()).expect("decode");
            if msg.kind == kind {
                return msg;
            }
        }
    }
}

async fn send(socket: &mut Socket, kind: &str, value: Value) {
    let text = json!({ "type": kind, "value": value.to_string() }).to_string();
    socket
        .send(Message::Text(text.into()))
        .await
        .expect("send");
}

#[tokio::test]
async fn test_upgrade_and_broadcast() {
    let app = TestApp::new().await;
    let addr = app.spawn().await;
    let (ada, ada_token) = app.guest("Ada");
    let (bob, bob_token) = app.guest("Bob");
    let session = app
        .create_session(&ada, SessionKind::Poker, SessionSettings::default())
        .await;
    app.join(session.id, &bob).await;

    let mut ada_ws = connect(addr, "poker", session.id, &ada_token).await;
    let init = recv_kind(&mut ada_ws, "init").await;
    let state: Value = init.payload().unwrap();
    assert_eq!(state["session"]["id"], json!(session.id));
    assert_eq!(state["board"]["kind"], "poker");

    let mut request = url(addr, "poker", session.id)
        .into_client_request()
        .unwrap();
    request.headers_mut().insert(
        AUTHORIZATION,
        format!("Bearer {bob_token}").parse().unwrap(),
    );
    let (mut bob_ws, _) = connect_async(request).await.unwrap();
    recv_kind(&mut bob_ws, "init").await;
    let joined = recv_kind(&mut ada_ws, "user_joined").await;
    assert_eq!(joined.user_id, Some(bob.user_id));

    send(&mut ada_ws, "add_plan", json!({ "name": "Search" })).await;
    let added = recv_kind(&mut bob_ws, "plan_added").await;
    let board: Value = added.payload().unwrap();
    assert_eq!(board["plans"][0]["name"], "Search");

    bob_ws.close(None).await.unwrap();
    let left = recv_kind(&mut ada_ws, "user_left").await;
    assert_eq!(left.user_id, Some(bob.user_id));
}

#[tokio::test]
async fn test_upgrade_prechecks() {
    let app = TestApp::new().await;
    let addr = app.spawn().await;
    let (ada, ada_token) = app.guest("Ada");
    let (_, stranger_token) = app.guest("Eve");
    let session = app
        .create_session(&ada, SessionKind::Retro, SessionSettings::default())
        .await;

    assert_eq!(
        refused(addr, "retro", session.id, "garbage").await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        refused(addr, "poker", session.id, &ada_token).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        refused(addr, "retro", SessionId::new(), &ada_token).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        refused(addr, "retro", session.id, &stranger_token).await,
        StatusCode::FORBIDDEN
    );

    let mut first = connect(addr, "retro", session.id, &ada_token).await;
    recv_kind(&mut first, "init").await;
    assert_eq!(
        refused(addr, "retro", session.id, &ada_token).await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_bad_frame_keeps_connection() {
    let app = TestApp::new().await;
    let addr = app.spawn().await;
    let (ada, ada_token) = app.guest("Ada");
    let session = app
        .create_session(&ada, SessionKind::Storyboard, SessionSettings::default())
        .await;

    let mut socket = connect(addr, "storyboard", session.id, &ada_token).await;
    recv_kind(&mut socket, "init").await;

    socket
        .send(Message::Text("{broken".into()))
        .await
        .unwrap();
    let err = recv_kind(&mut socket, "error").await;
    let body: Value = err.payload().unwrap();
    assert_eq!(body["code"], "EINVALID");

    send(&mut socket, "add_goal", json!({ "name": "Onboarding" })).await;
    let goals: Value = recv_kind(&mut socket, "goals_updated").await.payload().unwrap();
    assert_eq!(goals[0]["name"], "Onboarding");
}
