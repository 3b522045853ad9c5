// Controller API response types
//
// Models for the switch controller's JSON API. All responses are wrapped in
// the `{ meta: { rc, msg }, data: [...] }` envelope. Fields use
// `#[serde(default)]` liberally because the API is inconsistent about field
// presence across firmware versions, and every model carries a flattened
// catch-all so read-modify-write cycles never drop unknown fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard controller response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Envelope metadata. `rc == "ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Switch/device object from `stat/device`.
///
/// The controller returns 100+ fields per device; the ones the PoE flows
/// need are modeled explicitly and the rest land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoeDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Network id applied to overrides created for previously-default ports.
    #[serde(default)]
    pub last_connection_network_id: Option<String>,
    #[serde(default)]
    pub port_table: Vec<PortEntry>,
    #[serde(default)]
    pub port_overrides: Vec<PortOverride>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One physical port from a device's `port_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortEntry {
    pub port_idx: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poe_mode: Option<String>,
    /// Whether the port hardware is PoE-capable.
    #[serde(default)]
    pub port_poe: bool,
    #[serde(default)]
    pub poe_power: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A per-port configuration override.
///
/// Invariant: at most one override per `port_idx`; ports without an entry
/// implicitly run the switch default PoE mode (`"auto"`). The whole list is
/// PUT back on every change, so unknown fields must round-trip via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortOverride {
    pub port_idx: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_networkconf_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Normalize a MAC address to the controller's canonical form:
/// lowercase with `:` separators.
pub fn normalize_mac(mac: &str) -> String {
    mac.to_lowercase().replace(['-', '_'], ":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_mac_is_idempotent() {
        let canonical = "aa:bb:cc:dd:ee:ff";
        assert_eq!(normalize_mac("AA-BB-CC-DD-EE-FF"), canonical);
        assert_eq!(normalize_mac("aa_bb_cc_dd_ee_ff"), canonical);
        assert_eq!(normalize_mac(canonical), canonical);
        assert_eq!(normalize_mac(&normalize_mac("AA-BB-CC-DD-EE-FF")), canonical);
    }

    #[test]
    fn port_override_round_trips_unknown_fields() {
        let raw = json!({
            "port_idx": 7,
            "poe_mode": "auto",
            "stp_port_mode": true,
            "name": "Camera uplink"
        });

        let parsed: PortOverride = serde_json::from_value(raw.clone()).expect("parse override");
        assert_eq!(parsed.port_idx, 7);
        assert_eq!(parsed.poe_mode.as_deref(), Some("auto"));

        let back = serde_json::to_value(&parsed).expect("serialize override");
        assert_eq!(back, raw);
    }

    #[test]
    fn device_defaults_tolerate_sparse_payloads() {
        let device: PoeDevice = serde_json::from_value(json!({
            "_id": "abc",
            "mac": "aa:bb:cc:dd:ee:ff"
        }))
        .expect("parse device");

        assert!(device.port_table.is_empty());
        assert!(device.port_overrides.is_empty());
        assert!(device.last_connection_network_id.is_none());
    }
}
