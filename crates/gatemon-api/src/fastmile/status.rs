// Prelogin status snapshot
//
// The gateway's `prelogin_status_web_app.cgi` endpoint returns one big JSON
// document with every status section as a (usually single-element) array.
// Fields use `#[serde(default)]` liberally because the firmware is
// inconsistent about section presence; accessors return `Option`/empty
// instead of failing on whatever is missing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::fastmile::client::{FastmileClient, ResponseBody};

/// Full device snapshot from `prelogin_status_web_app.cgi`.
///
/// Re-fetched on every poll; there is no identity beyond "most recent poll
/// result". Unknown sections land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub device_info: Vec<DeviceInfo>,
    #[serde(default)]
    pub wan_conns: Vec<WanConn>,
    #[serde(default)]
    pub wan_ip_status: Vec<Value>,
    #[serde(default, rename = "cell_5G_stats_cfg")]
    pub cell_5g_stats_cfg: Vec<CellStatsEntry>,
    #[serde(default, rename = "cell_LTE_stats_cfg")]
    pub cell_lte_stats_cfg: Vec<CellStatsEntry>,
    #[serde(default, rename = "WAN")]
    pub wan: Vec<Value>,
    #[serde(default)]
    pub device_cfg: Vec<ConnectedDevice>,
    /// Catch-all for undocumented sections.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Device identity block from `device_info[0]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, rename = "ModelName")]
    pub model_name: Option<String>,
    #[serde(default, rename = "Vendor")]
    pub vendor: Option<String>,
    #[serde(default, rename = "SerialNumber")]
    pub serial_number: Option<String>,
    #[serde(default, rename = "HardwareVersion")]
    pub hardware_version: Option<String>,
    #[serde(default, rename = "SoftwareVersion")]
    pub software_version: Option<String>,
    /// Uptime in seconds since last boot.
    #[serde(default, rename = "UpTime")]
    pub uptime: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// WAN connection container; the useful data is in `ipConns[0]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WanConn {
    #[serde(default, rename = "ipConns")]
    pub ip_conns: Vec<IpConn>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A WAN IP connection entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpConn {
    #[serde(default, rename = "ConnectionStatus")]
    pub connection_status: Option<String>,
    #[serde(default, rename = "ConnectionType")]
    pub connection_type: Option<String>,
    #[serde(default, rename = "ExternalIPAddress")]
    pub external_ip_address: Option<String>,
    #[serde(default, rename = "SubnetMask")]
    pub subnet_mask: Option<String>,
    #[serde(default, rename = "DefaultGateway")]
    pub default_gateway: Option<String>,
    #[serde(default, rename = "DNSServers")]
    pub dns_servers: Option<String>,
    #[serde(default, rename = "NATEnabled")]
    pub nat_enabled: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One entry of `cell_5G_stats_cfg` / `cell_LTE_stats_cfg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellStatsEntry {
    #[serde(default)]
    pub stat: CellStats,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Radio statistics for one access technology.
///
/// Values are left as raw JSON because the firmware reports them
/// inconsistently (numbers on some versions, strings on others).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellStats {
    #[serde(default, rename = "RSSICurrent")]
    pub rssi: Option<Value>,
    #[serde(default, rename = "RSRPCurrent")]
    pub rsrp: Option<Value>,
    #[serde(default, rename = "RSRPStrengthIndexCurrent")]
    pub rsrp_strength_index: Option<Value>,
    #[serde(default, rename = "RSRQCurrent")]
    pub rsrq: Option<Value>,
    #[serde(default, rename = "SNRCurrent")]
    pub snr: Option<Value>,
    #[serde(default, rename = "SignalStrengthLevel")]
    pub signal_strength_level: Option<Value>,
    #[serde(default, rename = "FrequencyRange")]
    pub frequency_range: Option<Value>,
    #[serde(default, rename = "RankIndicator")]
    pub rank_indicator: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One connected LAN/WLAN device from `device_cfg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectedDevice {
    #[serde(default, rename = "HostName")]
    pub host_name: Option<String>,
    #[serde(default, rename = "IPAddress")]
    pub ip_address: Option<String>,
    #[serde(default, rename = "MACAddress")]
    pub mac_address: Option<String>,
    #[serde(default, rename = "InterfaceType")]
    pub interface_type: Option<String>,
    #[serde(default, rename = "Active")]
    pub active: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// WAN view combining the connection entry and the raw IP-status block.
#[derive(Debug, Clone, Copy)]
pub struct WanInfo<'a> {
    pub connection: Option<&'a IpConn>,
    pub status: Option<&'a Value>,
}

/// Cellular view across both radios plus the WAN mode block.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellularStats<'a> {
    pub five_g: Option<&'a CellStats>,
    pub lte: Option<&'a CellStats>,
    pub wan_mode: Option<&'a Value>,
}

impl StatusSnapshot {
    /// The device identity block, or `None` when the section is absent/empty.
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.first()
    }

    /// WAN connection details. `None` only when both the connection entry
    /// and the IP-status block are missing.
    pub fn wan_info(&self) -> Option<WanInfo<'_>> {
        let connection = self
            .wan_conns
            .first()
            .and_then(|conn| conn.ip_conns.first());
        let status = self.wan_ip_status.first();

        if connection.is_none() && status.is_none() {
            return None;
        }
        Some(WanInfo { connection, status })
    }

    /// Radio statistics for 5G and LTE, each independently optional.
    pub fn cellular_stats(&self) -> CellularStats<'_> {
        CellularStats {
            five_g: self.cell_5g_stats_cfg.first().map(|e| &e.stat),
            lte: self.cell_lte_stats_cfg.first().map(|e| &e.stat),
            wan_mode: self.wan.first(),
        }
    }

    /// All known LAN/WLAN devices; empty when the section is absent.
    pub fn connected_devices(&self) -> &[ConnectedDevice] {
        &self.device_cfg
    }
}

/// Format an uptime in seconds as `"{d}d {h}h {m}m"`, dropping seconds.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

impl FastmileClient {
    /// Fetch the full status snapshot.
    ///
    /// `GET prelogin_status_web_app.cgi` -- unauthenticated, one request,
    /// no caching.
    pub async fn get_prelogin_status(&self) -> Result<StatusSnapshot, Error> {
        debug!("fetching prelogin status");
        match self.get("prelogin_status_web_app.cgi").await? {
            ResponseBody::Json(value) => {
                serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: value.to_string(),
                })
            }
            ResponseBody::Raw(text) => Err(Error::Deserialization {
                message: "status endpoint returned non-JSON body".into(),
                body: text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> StatusSnapshot {
        serde_json::from_value(value).expect("valid snapshot fixture")
    }

    #[test]
    fn format_uptime_zero() {
        assert_eq!(format_uptime(0), "0d 0h 0m");
    }

    #[test]
    fn format_uptime_truncates_seconds() {
        // 90061s = 1d 1h 1m 1s
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
    }

    #[test]
    fn accessors_on_full_snapshot() {
        let snap = snapshot(json!({
            "device_info": [{
                "ModelName": "FastMile 5G Gateway 3.2",
                "Vendor": "Nokia",
                "SerialNumber": "SN123",
                "SoftwareVersion": "1.2209.0.2",
                "UpTime": 90061
            }],
            "wan_conns": [{ "ipConns": [{
                "ConnectionStatus": "Connected",
                "ExternalIPAddress": "100.64.1.2",
                "DefaultGateway": "100.64.1.1"
            }]}],
            "wan_ip_status": [{ "mode": "up" }],
            "cell_5G_stats_cfg": [{ "stat": { "RSRPCurrent": -85, "SNRCurrent": 18 } }],
            "cell_LTE_stats_cfg": [{ "stat": { "RSSICurrent": "-60" } }],
            "WAN": [{ "wan_mode": "5G" }],
            "device_cfg": [{ "IPAddress": "192.168.192.10", "MACAddress": "aa:bb:cc:dd:ee:ff", "Active": 1 }]
        }));

        let info = snap.device_info().expect("device info present");
        assert_eq!(info.model_name.as_deref(), Some("FastMile 5G Gateway 3.2"));
        assert_eq!(info.uptime, Some(90_061));

        let wan = snap.wan_info().expect("wan info present");
        let conn = wan.connection.expect("connection present");
        assert_eq!(conn.connection_status.as_deref(), Some("Connected"));
        assert!(wan.status.is_some());

        let cell = snap.cellular_stats();
        assert_eq!(cell.five_g.and_then(|s| s.rsrp.as_ref()), Some(&json!(-85)));
        assert_eq!(cell.lte.and_then(|s| s.rssi.as_ref()), Some(&json!("-60")));
        assert!(cell.wan_mode.is_some());

        assert_eq!(snap.connected_devices().len(), 1);
    }

    #[test]
    fn accessors_on_empty_snapshot() {
        let snap = snapshot(json!({}));

        assert!(snap.device_info().is_none());
        assert!(snap.wan_info().is_none());
        let cell = snap.cellular_stats();
        assert!(cell.five_g.is_none());
        assert!(cell.lte.is_none());
        assert!(cell.wan_mode.is_none());
        assert!(snap.connected_devices().is_empty());
    }

    #[test]
    fn accessors_on_empty_arrays() {
        let snap = snapshot(json!({
            "device_info": [],
            "wan_conns": [{ "ipConns": [] }],
            "cell_5G_stats_cfg": [],
            "device_cfg": []
        }));

        assert!(snap.device_info().is_none());
        assert!(snap.wan_info().is_none());
        assert!(snap.cellular_stats().five_g.is_none());
        assert!(snap.connected_devices().is_empty());
    }

    #[test]
    fn wan_info_present_with_only_ip_status() {
        let snap = snapshot(json!({ "wan_ip_status": [{ "x": 1 }] }));
        let wan = snap.wan_info().expect("status alone is enough");
        assert!(wan.connection.is_none());
        assert!(wan.status.is_some());
    }
}
