//! SQLite access shared by the wifisnap services

pub mod snapshot;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to the shared database, creating it (and its parent directory)
/// when missing, and ensures the schema exists.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the wifisnap tables if they don't exist
///
/// `associations` is the live snapshot, replaced wholesale each refresh.
/// `whitelist` and `hostname_overrides` belong to the façade and survive
/// refreshes untouched.
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS associations (
            ip TEXT PRIMARY KEY,
            mac TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL DEFAULT '',
            ap_name TEXT NOT NULL DEFAULT '',
            age TEXT NOT NULL DEFAULT '',
            essid_bssid_phy TEXT NOT NULL DEFAULT '',
            forward_mode TEXT NOT NULL DEFAULT '',
            profile TEXT NOT NULL DEFAULT '',
            roaming TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT '',
            connection_type TEXT NOT NULL DEFAULT '',
            user_type TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS whitelist (
            ip TEXT PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hostname_overrides (
            ip TEXT PRIMARY KEY,
            hostname TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (associations, whitelist, hostname_overrides)");

    Ok(())
}
