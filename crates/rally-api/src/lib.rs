//! # rally-api
//!
//! HTTP layer for Rally built on Axum.
//!
//! Provides the per-kind WebSocket upgrade endpoints, the thin session,
//! guest-token and alert endpoints that stand in for the full CRUD API,
//! the health endpoint, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
