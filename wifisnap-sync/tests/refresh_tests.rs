//! Integration tests for the refresh cycle against mock controllers
//!
//! Each mock speaks just enough of the controller management API: the login
//! exchange handing out a CSRF token and session id, and the showcommand
//! endpoint that demands both back before returning its canned user table.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::Row;
use std::collections::HashMap;
use tempfile::TempDir;
use wifisnap_common::config::FetchConfig;
use wifisnap_common::db::snapshot::SnapshotStore;
use wifisnap_sync::refresh::{run_refresh, EndpointStatus};

const CSRF_TOKEN: &str = "test-csrf-token";
const SESSION_ID: &str = "test-session-id";

async fn login() -> Json<Value> {
    Json(json!({
        "_global_result": {
            "status": "0",
            "status_str": "You've logged in successfully.",
            "X-CSRF-Token": CSRF_TOKEN,
            "UIDARUBA": SESSION_ID
        }
    }))
}

async fn login_rejected() -> Json<Value> {
    Json(json!({
        "_global_result": {
            "status": "1",
            "status_str": "Authentication failed."
        }
    }))
}

/// Start a mock controller returning `body` from showcommand.
///
/// The showcommand handler rejects requests missing the CSRF header or the
/// session id, so these tests also prove the client presents both.
async fn spawn_controller(body: Value) -> String {
    let show = move |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| {
        let body = body.clone();
        async move {
            let token_ok = headers
                .get("x-csrf-token")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == CSRF_TOKEN)
                .unwrap_or(false);
            let session_ok = params.get("UIDARUBA").map(String::as_str) == Some(SESSION_ID);
            let command_ok = params.contains_key("command");

            if token_ok && session_ok && command_ok {
                Ok(Json(body))
            } else {
                Err(StatusCode::FORBIDDEN)
            }
        }
    };

    let app = Router::new()
        .route("/v1/api/login", post(login))
        .route("/v1/configuration/showcommand", get(show));

    serve(app).await
}

/// Start a mock controller that rejects every login
async fn spawn_rejecting_controller() -> String {
    let app = Router::new().route("/v1/api/login", post(login_rejected));
    serve(app).await
}

/// Reserve a port with nothing listening on it
async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fetch_config(controllers: Vec<String>) -> FetchConfig {
    FetchConfig {
        controllers,
        username: "admin".to_string(),
        password: "secret".to_string(),
        command: "show user-table verbose".to_string(),
        danger_accept_invalid_certs: false,
        timeout_secs: 5,
    }
}

async fn setup_store() -> (TempDir, SnapshotStore) {
    let dir = TempDir::new().unwrap();
    let pool = wifisnap_common::db::init_pool(&dir.path().join("test.db"))
        .await
        .unwrap();
    (dir, SnapshotStore::new(pool))
}

async fn snapshot_rows(store: &SnapshotStore) -> Vec<(String, String)> {
    sqlx::query("SELECT ip, ap_name FROM associations ORDER BY ip")
        .fetch_all(store.pool())
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.get("ip"), row.get("ap_name")))
        .collect()
}

fn user(ip: &str, ap_name: &str) -> Value {
    json!({
        "AP name": ap_name,
        "Age(d:h:m)": "00:01:02",
        "Essid/Bssid/Phy": "CorpNet/aa:bb:cc:dd:ee:ff/5GHz-HE",
        "IP": ip,
        "MAC": "11:22:33:44:55:66",
        "Name": "client",
        "Profile": "staff_aaa_prof"
    })
}

#[tokio::test]
async fn unreachable_endpoint_does_not_abort_cycle() {
    // Controller A returns two clients, B is dead, C overrides one of A's IPs
    let a = spawn_controller(json!({
        "Users": [user("10.0.0.1", "AP-A1"), user("10.0.0.2", "AP-A2")]
    }))
    .await;
    let b = dead_endpoint().await;
    let c = spawn_controller(json!({ "Users": [user("10.0.0.1", "AP-C1")] })).await;

    let (_dir, store) = setup_store().await;
    let config = fetch_config(vec![a, b.clone(), c]);

    let report = run_refresh(&config, &store).await.unwrap();

    assert_eq!(report.total_inserted, 3);
    assert_eq!(report.failed_endpoints(), 1);
    assert!(matches!(
        report.endpoints[0].status,
        EndpointStatus::Ok { fetched: 2, inserted: 2 }
    ));
    assert_eq!(report.endpoints[1].endpoint, b);
    assert!(matches!(
        report.endpoints[1].status,
        EndpointStatus::Failed { .. }
    ));
    assert!(matches!(
        report.endpoints[2].status,
        EndpointStatus::Ok { fetched: 1, inserted: 1 }
    ));

    // Dedup by IP across controllers: the later controller wins 10.0.0.1
    assert_eq!(
        snapshot_rows(&store).await,
        vec![
            ("10.0.0.1".to_string(), "AP-C1".to_string()),
            ("10.0.0.2".to_string(), "AP-A2".to_string()),
        ]
    );
}

#[tokio::test]
async fn rejected_login_marks_endpoint_failed() {
    let good = spawn_controller(json!({ "Users": [user("10.0.0.5", "AP-5")] })).await;
    let bad = spawn_rejecting_controller().await;

    let (_dir, store) = setup_store().await;
    let config = fetch_config(vec![bad, good]);

    let report = run_refresh(&config, &store).await.unwrap();

    match &report.endpoints[0].status {
        EndpointStatus::Failed { error } => assert!(error.contains("Login rejected")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        snapshot_rows(&store).await,
        vec![("10.0.0.5".to_string(), "AP-5".to_string())]
    );
}

#[tokio::test]
async fn partial_records_are_normalized_with_defaults() {
    // Second record carries only an IP; everything else must default
    let endpoint = spawn_controller(json!({
        "Users": [user("10.0.0.1", "AP-1"), { "IP": "10.0.0.2" }]
    }))
    .await;

    let (_dir, store) = setup_store().await;
    let report = run_refresh(&fetch_config(vec![endpoint]), &store)
        .await
        .unwrap();

    assert_eq!(report.total_inserted, 2);
    assert_eq!(
        snapshot_rows(&store).await,
        vec![
            ("10.0.0.1".to_string(), "AP-1".to_string()),
            ("10.0.0.2".to_string(), "N/A".to_string()),
        ]
    );
}

#[tokio::test]
async fn missing_user_list_is_an_empty_batch() {
    let endpoint = spawn_controller(json!({ "_meta": [] })).await;

    let (_dir, store) = setup_store().await;
    let report = run_refresh(&fetch_config(vec![endpoint]), &store)
        .await
        .unwrap();

    assert!(matches!(
        report.endpoints[0].status,
        EndpointStatus::Ok { fetched: 0, inserted: 0 }
    ));
    assert!(snapshot_rows(&store).await.is_empty());
}

#[tokio::test]
async fn refresh_replaces_prior_snapshot_and_keeps_backup() {
    let (_dir, store) = setup_store().await;

    let first = spawn_controller(json!({ "Users": [user("10.0.0.1", "AP-OLD")] })).await;
    run_refresh(&fetch_config(vec![first]), &store)
        .await
        .unwrap();

    let second = spawn_controller(json!({ "Users": [user("10.0.0.2", "AP-NEW")] })).await;
    run_refresh(&fetch_config(vec![second]), &store)
        .await
        .unwrap();

    assert_eq!(
        snapshot_rows(&store).await,
        vec![("10.0.0.2".to_string(), "AP-NEW".to_string())]
    );

    let backup: Vec<(String, String)> =
        sqlx::query("SELECT ip, ap_name FROM associations_backup ORDER BY ip")
            .fetch_all(store.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|row| (row.get("ip"), row.get("ap_name")))
            .collect();
    assert_eq!(backup, vec![("10.0.0.1".to_string(), "AP-OLD".to_string())]);
}
