//! Raw controller record normalization
//!
//! The single boundary between the controller's untyped payload shape and the
//! canonical [`AssociationRecord`]. Total over any input: a missing or
//! non-string field degrades to its default instead of failing, so one
//! malformed record can never sink the rest of its batch.

use serde_json::Value;
use wifisnap_common::model::AssociationRecord;

fn field(raw: &Value, key: &str, default: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Map one raw user-table entry into the canonical record. Never fails.
pub fn normalize(raw: &Value) -> AssociationRecord {
    AssociationRecord {
        ap_name: field(raw, "AP name", "N/A"),
        age: field(raw, "Age(d:h:m)", ""),
        essid_bssid_phy: field(raw, "Essid/Bssid/Phy", ""),
        forward_mode: field(raw, "Forward mode", ""),
        ip: field(raw, "IP", ""),
        mac: field(raw, "MAC", ""),
        name: field(raw, "Name", ""),
        profile: field(raw, "Profile", ""),
        roaming: field(raw, "Roaming", ""),
        role: field(raw, "Role", ""),
        connection_type: field(raw, "Type", ""),
        user_type: field(raw, "User Type", ""),
    }
}
