//! Canonical data model shared by the poller and the façade

use serde::{Deserialize, Serialize};

/// One currently-associated wireless client, as reported by a controller at
/// poll time.
///
/// All fields are kept as the controller-formatted strings; nothing is parsed
/// here. `ip` is the natural key within a refresh cycle: two records with the
/// same IP collapse to the last one written, whichever controller they came
/// from. Records live only between two refresh cycles — each refresh replaces
/// the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRecord {
    /// Access point name; controllers report "N/A" when unknown
    pub ap_name: String,
    /// Association age as formatted by the controller (d:h:m), not parsed
    pub age: String,
    /// Slash-delimited network name / BSSID / radio band; may be empty
    pub essid_bssid_phy: String,
    pub forward_mode: String,
    /// Client IP address; de-duplication key within a refresh
    pub ip: String,
    pub mac: String,
    /// Hostname reported by the client; may be empty
    pub name: String,
    /// Authentication profile; the façade filters on this
    pub profile: String,
    pub roaming: String,
    pub role: String,
    pub connection_type: String,
    pub user_type: String,
}
