//! Web form: one page per cookie session, driven by plain HTML forms.

mod handlers;
mod state;

pub use state::{ServerState, Translators};

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tarjama_core::Config;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the router with every route of the form.
pub fn router(state: ServerState, max_upload_mb: u64) -> Router {
    let body_limit =
        usize::try_from(max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(handlers::index))
        .route("/provider", post(handlers::select_provider))
        .route("/credential", post(handlers::set_credential))
        .route("/upload", post(handlers::upload))
        .route("/translate", post(handlers::translate))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Serve the form on `addr` until Ctrl+C.
pub async fn run_server(config: Config, addr: &str) -> Result<()> {
    let idle_timeout = Duration::from_secs(config.server.session_idle_minutes.saturating_mul(60));
    let state = ServerState::new(
        config.limits.clone(),
        Translators::from_config(&config.providers),
        idle_timeout,
    );

    // Requests sweep the store too; this covers a server with no traffic.
    let store = state.store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            store.evict_idle();
        }
    });

    let app = router(state, config.server.max_upload_mb);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind server address {addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
