//! WebSocket upgrade handlers, one per session kind.
//!
//! The upgrade is refused over HTTP when the caller cannot be resolved,
//! the session is missing or of another kind, the caller has not joined,
//! or the caller already holds a connection. The hub repeats the last two
//! checks when the socket registers.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt, future};
use tracing::debug;

use rally_auth::Identity;
use rally_core::error::AppError;
use rally_core::reason;
use rally_core::types::SessionId;
use rally_entity::SessionKind;
use rally_realtime::Frame;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/ws/poker/{id}
pub async fn poker(
    state: State<AppState>,
    auth: AuthUser,
    path: Path<SessionId>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    upgrade(state, auth, path, ws, SessionKind::Poker).await
}

/// GET /api/ws/retro/{id}
pub async fn retro(
    state: State<AppState>,
    auth: AuthUser,
    path: Path<SessionId>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    upgrade(state, auth, path, ws, SessionKind::Retro).await
}

/// GET /api/ws/storyboard/{id}
pub async fn storyboard(
    state: State<AppState>,
    auth: AuthUser,
    path: Path<SessionId>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    upgrade(state, auth, path, ws, SessionKind::Storyboard).await
}

async fn upgrade(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(session_id): Path<SessionId>,
    ws: WebSocketUpgrade,
    kind: SessionKind,
) -> Result<Response, ApiError> {
    let session = state.store.get_session(session_id).await?;
    if session.kind != kind {
        return Err(AppError::not_found(format!("{kind} session {session_id} not found")).into());
    }

    let joined = state
        .store
        .get_participant(session_id, identity.user_id)
        .await?
        .is_some_and(|p| !p.abandoned);
    if !joined {
        return Err(AppError::authorization("join required").into());
    }

    if state.realtime.is_connected(session_id, identity.user_id) {
        return Err(AppError::conflict("Already connected to this session")
            .with_reason(reason::DUPLICATE_CONNECTION)
            .into());
    }

    let max_bytes = state.config.realtime.max_message_bytes;
    Ok(ws
        .max_message_size(max_bytes)
        .max_frame_size(max_bytes)
        .on_upgrade(move |socket| handle_socket(state, session_id, identity, socket)))
}

async fn handle_socket(
    state: AppState,
    session_id: SessionId,
    identity: Identity,
    socket: WebSocket,
) {
    let user_id = identity.user_id;
    let (ws_tx, ws_rx) = socket.split();
    let sink = ws_tx.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(to_message(frame))));
    let stream = ws_rx.filter_map(|msg| future::ready(from_message(msg)));

    if let Err(e) = state
        .realtime
        .serve(session_id, identity, sink, stream)
        .await
    {
        debug!(session_id = %session_id, user_id = %user_id, error = %e, "Socket refused by hub");
    }
}

fn to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Ping(data) => Message::Ping(data.into()),
        Frame::Pong(data) => Message::Pong(data.into()),
        Frame::Close => Message::Close(None),
    }
}

fn from_message(msg: Result<Message, axum::Error>) -> Option<Result<Frame, axum::Error>> {
    match msg {
        Ok(Message::Text(text)) => Some(Ok(Frame::Text(text.as_str().to_owned()))),
        Ok(Message::Ping(data)) => Some(Ok(Frame::Ping(data.to_vec()))),
        Ok(Message::Pong(data)) => Some(Ok(Frame::Pong(data.to_vec()))),
        Ok(Message::Close(_)) => Some(Ok(Frame::Close)),
        Ok(Message::Binary(_)) => None,
        Err(e) => Some(Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_conversion() {
        assert!(matches!(
            to_message(Frame::Text("{}".to_string())),
            Message::Text(t) if t.as_str() == "{}"
        ));
        assert!(matches!(to_message(Frame::Close), Message::Close(None)));

        let frame = from_message(Ok(Message::Text("hi".into()))).unwrap().unwrap();
        assert_eq!(frame, Frame::Text("hi".to_string()));
        assert!(from_message(Ok(Message::Binary(vec![1u8, 2].into()))).is_none());
    }
}
