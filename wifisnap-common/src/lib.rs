//! Shared library for the wifisnap services
//!
//! Holds the pieces both the poller (wifisnap-sync) and the HTTP façade
//! (wifisnap-api) need: the error type, TOML configuration, the canonical
//! association record, and SQLite access including the snapshot store.

pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{Error, Result};
