//! Server startup and graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use folio_core::Config;

use crate::state::AppState;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, state: Arc<AppState>, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let cleanup_task = (config.cleanup_interval_secs() > 0).then(|| {
        tracing::info!(
            interval_secs = config.cleanup_interval_secs(),
            retention_days = config.cleanup_retention_days(),
            "Scheduled cleanup enabled"
        );
        state.cleanup.clone().start(
            Duration::from_secs(config.cleanup_interval_secs()),
            config.cleanup_retention_days(),
        )
    });

    let limits = config.size_limits();
    tracing::info!(
        max_image_mb = limits.image_bytes / 1024 / 1024,
        max_document_mb = limits.document_bytes / 1024 / 1024,
        environment = %config.environment(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }

    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
