//! wifisnap-api - HTTP façade over the association snapshot
//!
//! Serves the snapshot maintained by wifisnap-sync: profile-filtered client
//! listing joined against the whitelist and hostname overrides, plus edit
//! endpoints for those two sets.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wifisnap_api::{build_router, AppState};
use wifisnap_common::config::Config;

#[derive(Parser)]
#[command(name = "wifisnap-api", about = "Serve the wireless client snapshot")]
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

    info!("Starting wifisnap-api v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config)?;

    let pool = wifisnap_common::db::init_pool(&config.database_path).await?;
    info!("Database: {}", config.database_path.display());

    let state = AppState::new(pool, config.api.profile_aliases.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.api.bind_addr.as_str()).await?;
    info!("wifisnap-api listening on http://{}", config.api.bind_addr);
    info!("Health check: http://{}/health", config.api.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
