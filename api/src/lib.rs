pub mod core;
pub mod error_handler;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use redmine_client::TrackerConnector;
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::{app_state::AppState, config::AppConfig},
    error_handler::{AppError, AppResult},
    routes::gitlab_webhook::gitlab_webhook_route::{MAX_WEBHOOK_BODY, gitlab_webhook_route},
};

/// Loads configuration from the environment and serves the webhook until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config)?;

    info!(
        address = %config.api_address,
        redmine = %config.redmine_url,
        users = ?config.credentials,
        "starting gitlab webhook relay"
    );

    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&config.api_address)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.api_address.clone(),
            source,
        })?;

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Builds the HTTP surface: a single `POST /` webhook route.
pub fn router<C: TrackerConnector>(state: AppState<C>) -> Router {
    Router::new()
        .route("/", post(gitlab_webhook_route::<C>))
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY))
        .with_state(Arc::new(state))
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        // Without a signal handler keep serving; the process is stopped externally.
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
