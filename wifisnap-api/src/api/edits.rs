//! Whitelist and hostname-override edits
//!
//! These sets belong to the façade and survive snapshot refreshes; the poller
//! never touches them.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::AppState;

/// Body for hostname override upserts
#[derive(Debug, Deserialize)]
pub struct HostnameRequest {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Body for whitelist membership changes
#[derive(Debug, Deserialize)]
pub struct WhitelistRequest {
    #[serde(default)]
    pub ip: Option<String>,
}

fn require(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::InvalidInput(format!("{} is required", name))),
    }
}

/// POST /api/clients/hostname
///
/// Insert or update the display-name override for an IP.
pub async fn set_hostname(
    State(state): State<AppState>,
    Json(request): Json<HostnameRequest>,
) -> Result<Json<Value>, ApiError> {
    let ip = require(request.ip, "ip")?;
    let hostname = require(request.hostname, "hostname")?;

    sqlx::query(
        r#"
        INSERT INTO hostname_overrides (ip, hostname) VALUES (?, ?)
        ON CONFLICT(ip) DO UPDATE SET hostname = excluded.hostname
        "#,
    )
    .bind(&ip)
    .bind(&hostname)
    .execute(&state.db)
    .await?;

    tracing::info!(ip = %ip, hostname = %hostname, "Hostname override updated");

    Ok(Json(json!({ "message": "Hostname updated successfully" })))
}

/// POST /api/whitelist
///
/// Idempotent add: whitelisting an already-whitelisted IP is not an error.
pub async fn add_whitelist(
    State(state): State<AppState>,
    Json(request): Json<WhitelistRequest>,
) -> Result<Json<Value>, ApiError> {
    let ip = require(request.ip, "ip")?;

    sqlx::query("INSERT OR IGNORE INTO whitelist (ip) VALUES (?)")
        .bind(&ip)
        .execute(&state.db)
        .await?;

    tracing::info!(ip = %ip, "Added to whitelist");

    Ok(Json(json!({ "message": format!("{} added to whitelist", ip) })))
}

/// DELETE /api/whitelist
pub async fn remove_whitelist(
    State(state): State<AppState>,
    Json(request): Json<WhitelistRequest>,
) -> Result<Json<Value>, ApiError> {
    let ip = require(request.ip, "ip")?;

    sqlx::query("DELETE FROM whitelist WHERE ip = ?")
        .bind(&ip)
        .execute(&state.db)
        .await?;

    tracing::info!(ip = %ip, "Removed from whitelist");

    Ok(Json(json!({ "message": format!("{} removed from whitelist", ip) })))
}
