//! Session create, fetch, join, and delete.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;
use validator::Validate;

use rally_core::error::AppError;
use rally_core::reason;
use rally_core::types::SessionId;
use rally_entity::Session;
use rally_store::NewSession;

use crate::dto::request::{CreateSessionRequest, JoinSessionRequest};
use crate::dto::response::{ApiResponse, JoinResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/sessions
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Session>>), ApiError> {
    req.validate()?;
    let settings = req.settings.unwrap_or_default();
    if settings.point_values.is_empty() {
        return Err(AppError::validation("At least one point value is required").into());
    }
    if settings.max_votes == 0 {
        return Err(AppError::validation("max_votes must be at least 1").into());
    }

    let session = state
        .store
        .create_session(NewSession {
            kind: req.kind,
            name: req.name,
            created_by: auth.user_id,
            creator_name: auth.name.clone(),
            join_code: req.join_code,
            facilitator_code: req.facilitator_code,
            settings,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// GET /api/sessions/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(session_id): Path<SessionId>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let session = state.store.get_session(session_id).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/sessions/{id}/join
///
/// Members who have not abandoned the session rejoin without a code.
pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<SessionId>,
    body: Option<Json<JoinSessionRequest>>,
) -> Result<Json<ApiResponse<JoinResponse>>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let session = state.store.get_session(session_id).await?;

    let member = state
        .store
        .get_participant(session_id, auth.user_id)
        .await?
        .is_some_and(|p| !p.abandoned);
    if !member
        && !state
            .store
            .verify_join_code(session_id, req.join_code.as_deref())
            .await?
    {
        return Err(AppError::authorization("Incorrect join code")
            .with_reason(reason::INVALID_CODE)
            .into());
    }

    let participants = state
        .store
        .add_participant(session_id, auth.user_id, &auth.name, req.spectator)
        .await?;
    info!(session_id = %session_id, user_id = %auth.user_id, "Participant joined");

    Ok(Json(ApiResponse::ok(JoinResponse {
        session,
        participants,
    })))
}

/// DELETE /api/sessions/{id}
///
/// Facilitators and application admins only. Live connections receive
/// `session_deleted` and are closed.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    let session = state.store.get_session(session_id).await?;
    if !session.is_facilitator(auth.user_id) && !state.auth.is_application_admin(&auth).await? {
        return Err(AppError::authorization("Only a facilitator may delete the session").into());
    }

    state.store.delete_session(session_id).await?;
    state.realtime.shutdown_session(session_id).await;
    info!(session_id = %session_id, user_id = %auth.user_id, "Session deleted");

    Ok(StatusCode::NO_CONTENT)
}
