//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_core::Config;
use folio_db::PgAssetRepository;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(config).await?;
    let storage = storage::setup_storage(config).await?;

    let state = Arc::new(AppState::new(
        Arc::new(PgAssetRepository::new(pool)),
        storage,
        config.validator(),
        config.public_base_url(),
    ));

    let router = routes::setup_routes(&routes::RouterSettings::from_config(config), state.clone())?;

    Ok((state, router))
}
