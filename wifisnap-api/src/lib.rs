//! wifisnap-api library - Query/Edit façade over the association snapshot
//!
//! Read-mostly HTTP service: lists the current snapshot filtered by profile,
//! joined at read time against the whitelist and hostname-override sets, and
//! accepts edits to those two sets. Never writes the snapshot itself — that
//! is wifisnap-sync's job.

use axum::Router;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection pool
    pub db: SqlitePool,
    /// Maps a selectable profile name to the backend profiles it covers
    pub profile_aliases: HashMap<String, Vec<String>>,
}

impl AppState {
    pub fn new(db: SqlitePool, profile_aliases: HashMap<String, Vec<String>>) -> Self {
        Self {
            db,
            profile_aliases,
        }
    }

    /// Backend profile names covered by a selected profile; a name with no
    /// alias entry matches itself literally.
    pub fn profile_candidates(&self, profile: &str) -> Vec<String> {
        self.profile_aliases
            .get(profile)
            .cloned()
            .unwrap_or_else(|| vec![profile.to_string()])
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/clients", get(api::list_clients))
        .route("/api/clients/hostname", post(api::set_hostname))
        .route(
            "/api/whitelist",
            post(api::add_whitelist).delete(api::remove_whitelist),
        )
        // Browser frontends are served from other origins
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
