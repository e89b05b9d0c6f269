//! wifisnap-sync - one-shot snapshot refresh
//!
//! Polls every configured wireless controller and replaces the local
//! association snapshot. Meant to be invoked by an external scheduler (cron,
//! systemd timer) or by hand; each run is a complete, independent cycle.
//! Exits non-zero only when the snapshot store itself fails — partial
//! controller failures are reported in the logs and the run still commits
//! what it gathered.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wifisnap_common::config::Config;
use wifisnap_common::db::snapshot::SnapshotStore;
use wifisnap_sync::refresh::run_refresh;

#[derive(Parser)]
#[command(name = "wifisnap-sync", about = "Refresh the wireless client snapshot")]
struct Args {
    /// Path to the wifisnap configuration file
    #[arg(long, env = "WIFISNAP_CONFIG", default_value = "wifisnap.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting wifisnap-sync v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config)?;
    info!(
        "Configured controllers: {}",
        config.fetch.controllers.len()
    );

    let pool = wifisnap_common::db::init_pool(&config.database_path).await?;
    info!("Database: {}", config.database_path.display());

    let store = SnapshotStore::new(pool);
    let report = run_refresh(&config.fetch, &store).await?;

    if let Ok(json) = serde_json::to_string(&report) {
        tracing::debug!(report = %json, "Refresh report");
    }

    info!(
        total_inserted = report.total_inserted,
        failed_endpoints = report.failed_endpoints(),
        duration_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "Refresh cycle committed"
    );

    Ok(())
}
