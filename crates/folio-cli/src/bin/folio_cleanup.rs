//! Purge media that has sat in the trash longer than the retention period.
//!
//! Reads DATABASE_URL, STORAGE_PATH and PUBLIC_BASE_URL like the API server.
//! Exits non-zero when any asset failed to purge.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use folio_cli::{format_dry_run, format_report, init_tracing, DryRunSummary};
use folio_core::Config;
use folio_db::PgAssetRepository;
use folio_services::CleanupService;
use folio_storage::LocalStorage;
use sqlx::postgres::PgPoolOptions;

#[derive(Parser, Debug)]
#[command(name = "folio-cleanup")]
#[command(about = "Permanently delete media trashed longer than the retention period")]
struct Args {
    /// Days a trashed asset is kept (default: CLEANUP_RETENTION_DAYS or 30)
    #[arg(long, value_name = "DAYS")]
    retention_days: Option<i64>,

    /// Only count what would be purged
    #[arg(long)]
    dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env()?;

    let retention_days = args
        .retention_days
        .unwrap_or_else(|| config.cleanup_retention_days());
    if retention_days < 0 {
        anyhow::bail!("--retention-days must be zero or greater");
    }

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;
    let storage = LocalStorage::new(
        config.storage_path().to_path_buf(),
        config.public_base_url().to_string(),
    )
    .await
    .context("Failed to open storage")?;

    let cleanup = CleanupService::new(Arc::new(PgAssetRepository::new(pool)), Arc::new(storage));

    if args.dry_run {
        let summary = DryRunSummary {
            retention_days,
            would_clean: cleanup.dry_run_count(retention_days).await?,
        };
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{}", format_dry_run(&summary));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let report = cleanup.run_cleanup(retention_days).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report, retention_days));
    }

    if report.failed > 0 {
        tracing::error!(failed = report.failed, "Cleanup finished with failures");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
