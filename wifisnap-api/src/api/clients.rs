//! Snapshot listing with whitelist and hostname-override joins

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::{HashMap, HashSet};

use super::ApiError;
use crate::AppState;

/// Query parameters for client listing
#[derive(Debug, Deserialize)]
pub struct ClientsQuery {
    /// Selected profile; omit to list every profile
    pub profile: Option<String>,
}

/// One snapshot row as served to frontends
#[derive(Debug, Serialize)]
pub struct ClientRow {
    /// Override hostname when one exists, else the controller-reported name
    pub hostname: String,
    pub ip: String,
    /// Radio band parsed out of the essid/bssid/phy string, when present
    pub band: Option<String>,
    pub ssid: String,
    pub ap_name: String,
    /// Association age as formatted by the controller
    pub duration: String,
    pub whitelisted: bool,
}

/// GET /api/clients
///
/// Lists the current snapshot, optionally filtered by profile (expanded
/// through the configured aliases), left-joined against the whitelist set and
/// the hostname-override mapping.
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientsQuery>,
) -> Result<Json<Vec<ClientRow>>, ApiError> {
    let whitelisted: HashSet<String> = sqlx::query("SELECT ip FROM whitelist")
        .fetch_all(&state.db)
        .await?
        .into_iter()
        .map(|row| row.get("ip"))
        .collect();

    let overrides: HashMap<String, String> = sqlx::query("SELECT ip, hostname FROM hostname_overrides")
        .fetch_all(&state.db)
        .await?
        .into_iter()
        .map(|row| (row.get("ip"), row.get("hostname")))
        .collect();

    const COLUMNS: &str = "SELECT name, ip, essid_bssid_phy, ap_name, age FROM associations";

    let rows = match &query.profile {
        Some(profile) => {
            let candidates = state.profile_candidates(profile);
            let placeholders = vec!["?"; candidates.len()].join(",");
            let sql = format!("{} WHERE profile IN ({}) ORDER BY ip", COLUMNS, placeholders);

            let mut q = sqlx::query(&sql);
            for candidate in &candidates {
                q = q.bind(candidate);
            }
            q.fetch_all(&state.db).await?
        }
        None => {
            sqlx::query(&format!("{} ORDER BY ip", COLUMNS))
                .fetch_all(&state.db)
                .await?
        }
    };

    let clients = rows
        .into_iter()
        .map(|row| {
            let name: String = row.get("name");
            let ip: String = row.get("ip");
            let essid_bssid_phy: String = row.get("essid_bssid_phy");

            ClientRow {
                hostname: overrides.get(&ip).cloned().unwrap_or(name),
                band: band_from_essid(&essid_bssid_phy),
                ssid: essid_bssid_phy,
                ap_name: row.get("ap_name"),
                duration: row.get("age"),
                whitelisted: whitelisted.contains(&ip),
                ip,
            }
        })
        .collect();

    Ok(Json(clients))
}

/// Parse the radio band out of a slash-delimited essid/bssid/phy string,
/// e.g. "CorpNet/aa:bb:cc:dd:ee:ff/5GHz-HE" yields "5GHz".
fn band_from_essid(essid_bssid_phy: &str) -> Option<String> {
    if !essid_bssid_phy.contains('/') {
        return None;
    }
    let phy = essid_bssid_phy.rsplit('/').next()?;
    let band = phy.split('-').next().unwrap_or(phy);
    Some(band.to_string())
}
