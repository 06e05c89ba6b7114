//! Application state shared across all handlers.

use std::fmt;
use std::sync::Arc;

use rally_auth::{Authenticator, JwtEncoder};
use rally_core::config::AppConfig;
use rally_realtime::RealtimeEngine;
use rally_store::{AlertCache, Store};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Persistence collaborator
    pub store: Arc<dyn Store>,
    /// Caller resolution and admin checks
    pub auth: Arc<dyn Authenticator>,
    /// Token issuer for guest sign-in
    pub jwt_encoder: Arc<JwtEncoder>,
    /// Active alert snapshot
    pub alerts: Arc<AlertCache>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .field("alerts", &self.alerts)
            .finish_non_exhaustive()
    }
}
