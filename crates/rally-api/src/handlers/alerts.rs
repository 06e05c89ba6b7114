//! Global alert banners.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;
use validator::Validate;

use rally_core::types::AlertId;
use rally_entity::Alert;
use rally_store::NewAlert;

use crate::dto::request::CreateAlertRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::state::AppState;

/// GET /api/alerts
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<Alert>>> {
    Json(ApiResponse::ok(state.alerts.read().to_vec()))
}

/// POST /api/admin/alerts
pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Alert>>), ApiError> {
    req.validate()?;
    let new = NewAlert {
        name: req.name,
        content: req.content,
        level: req.level,
        dismissible: req.dismissible,
    };
    let alert = state
        .alerts
        .refresh_on(|store| async move { store.create_alert(new).await })
        .await?;
    info!(alert_id = %alert.id, user_id = %admin.user_id, "Alert created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(alert))))
}

/// DELETE /api/admin/alerts/{id}
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(alert_id): Path<AlertId>,
) -> Result<StatusCode, ApiError> {
    state
        .alerts
        .refresh_on(|store| async move { store.delete_alert(alert_id).await })
        .await?;
    info!(alert_id = %alert_id, user_id = %admin.user_id, "Alert deleted");

    Ok(StatusCode::NO_CONTENT)
}
