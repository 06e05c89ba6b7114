//! Guest sign-in and caller lookup.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use validator::Validate;

use rally_core::types::UserId;
use rally_entity::UserRole;

use crate::dto::request::GuestRequest;
use crate::dto::response::{ApiResponse, GuestResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/guest
pub async fn guest(
    State(state): State<AppState>,
    Json(req): Json<GuestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let name = req.name.trim().to_string();
    let user_id = UserId::new();
    let token = state.jwt_encoder.issue(user_id, &name, UserRole::Guest)?;
    tracing::info!(user_id = %user_id, "Guest signed in");

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.config.auth.cookie_name,
        token,
        state.config.auth.token_ttl_hours * 3600
    );
    let body = ApiResponse::ok(GuestResponse {
        token,
        user: UserResponse {
            id: user_id,
            name,
            role: UserRole::Guest,
        },
    });

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(body)))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(UserResponse {
        id: auth.user_id,
        name: auth.name.clone(),
        role: auth.role,
    }))
}
