//! Application builder: wires collaborators, router, and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use rally_auth::{Authenticator, JwtAuthenticator, JwtDecoder, JwtEncoder};
use rally_core::config::AppConfig;
use rally_core::error::AppError;
use rally_core::result::AppResult;
use rally_core::traits::Mailer;
use rally_realtime::RealtimeEngine;
use rally_store::{AlertCache, LogMailer, MemoryStore, Store};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Constructs every collaborator and the real-time engine.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn Store> = memory.clone();

    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let auth: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(jwt_decoder, &config.auth));

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(memory.clone(), &config.notifications));
    let alerts = Arc::new(AlertCache::init(memory).await?);

    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        Arc::clone(&store),
        Arc::clone(&auth),
        mailer,
        config.notifications.completion_emails,
    ));

    Ok(AppState {
        config: Arc::new(config),
        store,
        auth,
        jwt_encoder,
        alerts,
        realtime,
    })
}

/// Runs the Rally server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting Rally server...");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = build_state(config).await?;
    let realtime = Arc::clone(&state.realtime);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!("Rally server listening on {}", addr);

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            if tokio::time::timeout(grace, realtime.shutdown()).await.is_err() {
                warn!("Real-time shutdown exceeded the grace period");
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Rally server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
