//! Refresh orchestrator
//!
//! One refresh cycle: open the snapshot refresh transaction, poll every
//! configured controller in order, upsert whatever each one returned, then
//! commit once. A controller that cannot be reached, rejects the login, or
//! returns garbage is recorded as failed and skipped; a record that fails to
//! insert is logged and skipped. Neither takes down the cycle — only a
//! snapshot store begin/commit failure does.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use wifisnap_common::config::FetchConfig;
use wifisnap_common::db::snapshot::{RefreshTransaction, SnapshotStore};
use wifisnap_common::Result;

use crate::controller::ControllerClient;
use crate::normalize::normalize;

/// Outcome of one refresh cycle
#[derive(Debug, Serialize)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Upserts performed across all controllers (replacements included)
    pub total_inserted: usize,
    pub endpoints: Vec<EndpointOutcome>,
}

/// Per-controller outcome within a refresh cycle
#[derive(Debug, Serialize)]
pub struct EndpointOutcome {
    pub endpoint: String,
    #[serde(flatten)]
    pub status: EndpointStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EndpointStatus {
    Ok { fetched: usize, inserted: usize },
    Failed { error: String },
}

impl RefreshReport {
    pub fn failed_endpoints(&self) -> usize {
        self.endpoints
            .iter()
            .filter(|o| matches!(o.status, EndpointStatus::Failed { .. }))
            .count()
    }
}

/// Run one full refresh cycle against every configured controller.
///
/// Stateless between invocations; each call is an independent poll cycle.
/// Only a snapshot store failure (begin or commit) propagates — per-endpoint
/// and per-record failures end up in the report and the logs.
pub async fn run_refresh(fetch: &FetchConfig, store: &SnapshotStore) -> Result<RefreshReport> {
    let started_at = Utc::now();

    // Backup and clear exactly once, before contacting any controller
    let mut tx = store.begin_refresh().await?;

    let mut endpoints = Vec::with_capacity(fetch.controllers.len());
    let mut total_inserted = 0;

    for endpoint in &fetch.controllers {
        tracing::info!(endpoint = %endpoint, "Polling controller");

        let status = poll_controller(endpoint, fetch, &mut tx).await;
        match &status {
            EndpointStatus::Ok { fetched, inserted } => {
                total_inserted += inserted;
                tracing::info!(
                    endpoint = %endpoint,
                    fetched = fetched,
                    inserted = inserted,
                    "Controller polled"
                );
            }
            EndpointStatus::Failed { error } => {
                tracing::error!(endpoint = %endpoint, error = %error, "Controller poll failed");
            }
        }

        endpoints.push(EndpointOutcome {
            endpoint: endpoint.clone(),
            status,
        });
    }

    // One commit after every endpoint has been attempted
    tx.commit().await?;

    Ok(RefreshReport {
        started_at,
        finished_at: Utc::now(),
        total_inserted,
        endpoints,
    })
}

/// Authenticate, query, and ingest one controller's records.
///
/// Errors on the login/query path fail the endpoint as a whole; a failed
/// upsert only costs that record.
async fn poll_controller(
    endpoint: &str,
    fetch: &FetchConfig,
    tx: &mut RefreshTransaction,
) -> EndpointStatus {
    let session = match ControllerClient::new(endpoint, fetch) {
        Ok(client) => match client.login().await {
            Ok(session) => session,
            Err(e) => {
                return EndpointStatus::Failed {
                    error: e.to_string(),
                }
            }
        },
        Err(e) => {
            return EndpointStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    let body = match session.show_command(&fetch.command).await {
        Ok(body) => body,
        Err(e) => {
            return EndpointStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    let users = match body.get("Users").and_then(Value::as_array) {
        Some(users) => users.as_slice(),
        // A controller with no associated clients omits the list entirely
        None => &[],
    };

    let mut inserted = 0;
    for (index, raw) in users.iter().enumerate() {
        let record = normalize(raw);
        match tx.upsert(&record).await {
            Ok(()) => inserted += 1,
            Err(e) => {
                tracing::error!(
                    endpoint = %endpoint,
                    record_index = index,
                    error = %e,
                    "Failed to insert record"
                );
            }
        }
    }

    EndpointStatus::Ok {
        fetched: users.len(),
        inserted,
    }
}
