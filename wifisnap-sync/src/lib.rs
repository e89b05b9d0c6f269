//! wifisnap-sync library - controller polling and snapshot refresh
//!
//! The refresh pipeline: authenticate against each configured controller,
//! run the user-table query, normalize each raw record, and replace the
//! shared snapshot table in one committed cycle. Failures are isolated per
//! controller and per record; only a snapshot store failure is fatal.

pub mod controller;
pub mod normalize;
pub mod refresh;
