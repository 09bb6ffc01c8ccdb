//! HTTP server lifecycle
//!
//! Binds the listener, runs the periodic artifact sweeper alongside the
//! router, and tears both down on shutdown.

pub mod http;

pub use http::create_router;

use crate::artifacts::spawn_sweeper;
use crate::state::config::Config;
use crate::state::AppState;
use crate::Result;
use log::{info, warn};
use std::future::Future;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Serve the API until `shutdown` resolves
///
/// The sweeper is stopped once the server has drained, then one final
/// sweep removes whatever is still tracked.
pub async fn serve<F>(config: &Config, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host(), config.port());
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    let tracker = state.service.tracker();
    let (stop_tx, stop_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(tracker.clone(), config.cleanup_interval(), stop_rx);
    info!(
        "Cleaning up generated audio every {:?}",
        config.cleanup_interval()
    );

    let result = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await;

    if stop_tx.send(true).is_err() {
        warn!("Sweeper already stopped");
    }
    if let Err(e) = sweeper.await {
        warn!("Sweeper task ended abnormally: {}", e);
    }

    match tokio::task::spawn_blocking(move || tracker.reclaim_all()).await {
        Ok(report) => info!("Final sweep removed {} files", report.removed),
        Err(e) => warn!("Final sweep failed: {}", e),
    }

    info!("Server shutdown complete");
    result.map_err(Into::into)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
