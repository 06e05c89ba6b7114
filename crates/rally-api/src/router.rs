//! Route definitions for the Rally HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::Router;
use axum::routing::{delete, get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route; middleware is layered in
/// [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/guest", post(handlers::auth::guest))
        .route("/me", get(handlers::auth::me));

    let sessions = Router::new()
        .route("/", post(handlers::session::create))
        .route(
            "/{id}",
            get(handlers::session::get).delete(handlers::session::delete),
        )
        .route("/{id}/join", post(handlers::session::join));

    let admin = Router::new()
        .route("/alerts", post(handlers::alerts::create))
        .route("/alerts/{id}", delete(handlers::alerts::delete));

    let ws = Router::new()
        .route("/poker/{id}", get(handlers::ws::poker))
        .route("/retro/{id}", get(handlers::ws::retro))
        .route("/storyboard/{id}", get(handlers::ws::storyboard));

    let api = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/alerts", get(handlers::alerts::list))
        .nest("/auth", auth)
        .nest("/sessions", sessions)
        .nest("/admin", admin)
        .nest("/ws", ws);

    Router::new().nest("/api", api).with_state(state)
}
