// Device reads and the MAC-keyed cache
//
// `stat/device` is the only read endpoint; everything else is a view over
// it. The cache holds the last-fetched record per normalized MAC and is
// repopulated wholesale on every list. Mutating flows (ports.rs) remove the
// affected entry before and after writing so reads never see stale state.

use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::poe::client::PoeClient;
use crate::poe::models::{PoeDevice, PortEntry, PortOverride, normalize_mac};

/// Setup-time connectivity probe result: what the controller can see and
/// which of it is PoE-capable. Feeds port discovery during configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTest {
    pub device_count: usize,
    pub poe_devices: Vec<PoeDeviceSummary>,
}

/// One PoE-capable device in a [`ConnectionTest`].
#[derive(Debug, Clone, Serialize)]
pub struct PoeDeviceSummary {
    pub name: String,
    pub mac: String,
    pub model: String,
    pub device_type: String,
    pub poe_ports: Vec<PoePortSummary>,
}

/// One PoE-capable port in a [`PoeDeviceSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct PoePortSummary {
    pub port_idx: u32,
    pub name: String,
    pub poe_mode: String,
    pub poe_power: String,
}

impl PoeClient {
    /// List all devices with full statistics.
    ///
    /// `GET stat/device` -- repopulates the cache with every returned
    /// device, keyed by normalized MAC.
    pub async fn list_devices(&mut self) -> Result<Vec<PoeDevice>, Error> {
        debug!("listing devices");
        let devices: Vec<PoeDevice> = self
            .request_envelope(Method::GET, "stat/device", None)
            .await?;

        for device in &devices {
            self.cache
                .insert(normalize_mac(&device.mac), device.clone());
        }

        Ok(devices)
    }

    /// Get a single device by MAC address.
    ///
    /// The MAC is normalized first; a cache hit is served as-is, otherwise
    /// the full device list is refetched. `None` when the controller knows
    /// no such device.
    pub async fn device_by_mac(&mut self, mac: &str) -> Result<Option<PoeDevice>, Error> {
        let mac = normalize_mac(mac);

        if let Some(device) = self.cache.get(&mac) {
            return Ok(Some(device.clone()));
        }

        self.list_devices().await?;
        Ok(self.cache.get(&mac).cloned())
    }

    /// The port table of a specific device.
    pub async fn port_table(&mut self, mac: &str) -> Result<Vec<PortEntry>, Error> {
        let device = self.require_device(mac).await?;
        Ok(device.port_table)
    }

    /// The port-override list of a specific device.
    pub async fn port_overrides(&mut self, mac: &str) -> Result<Vec<PortOverride>, Error> {
        let device = self.require_device(mac).await?;
        Ok(device.port_overrides)
    }

    /// All devices that have at least one PoE-capable port, with those ports.
    pub async fn poe_devices(&mut self) -> Result<Vec<(PoeDevice, Vec<PortEntry>)>, Error> {
        let devices = self.list_devices().await?;

        Ok(devices
            .into_iter()
            .filter_map(|device| {
                let poe_ports: Vec<PortEntry> = device
                    .port_table
                    .iter()
                    .filter(|p| p.port_poe)
                    .cloned()
                    .collect();
                if poe_ports.is_empty() {
                    None
                } else {
                    Some((device, poe_ports))
                }
            })
            .collect())
    }

    /// Probe the controller and summarize what it exposes.
    ///
    /// Used at setup time to verify credentials and enumerate selectable
    /// PoE ports.
    pub async fn test_connection(&mut self) -> Result<ConnectionTest, Error> {
        let devices = self.list_devices().await?;
        let device_count = devices.len();

        let poe_devices = devices
            .into_iter()
            .filter_map(|device| {
                let poe_ports: Vec<PoePortSummary> = device
                    .port_table
                    .iter()
                    .filter(|p| p.port_poe)
                    .map(|p| PoePortSummary {
                        port_idx: p.port_idx,
                        name: p
                            .name
                            .clone()
                            .unwrap_or_else(|| format!("Port {}", p.port_idx)),
                        poe_mode: p.poe_mode.clone().unwrap_or_else(|| "N/A".into()),
                        poe_power: p
                            .poe_power
                            .as_ref()
                            .map_or_else(|| "0".into(), |v| match v.as_str() {
                                Some(s) => s.to_owned(),
                                None => v.to_string(),
                            }),
                    })
                    .collect();

                if poe_ports.is_empty() {
                    return None;
                }
                Some(PoeDeviceSummary {
                    name: device.name.clone().unwrap_or_else(|| "Unknown".into()),
                    mac: device.mac.clone(),
                    model: device.model.clone().unwrap_or_else(|| "Unknown".into()),
                    device_type: device
                        .device_type
                        .clone()
                        .unwrap_or_else(|| "unknown".into()),
                    poe_ports,
                })
            })
            .collect();

        Ok(ConnectionTest {
            device_count,
            poe_devices,
        })
    }

    /// Fetch a device by MAC, failing with [`Error::DeviceNotFound`].
    pub(crate) async fn require_device(&mut self, mac: &str) -> Result<PoeDevice, Error> {
        self.device_by_mac(mac)
            .await?
            .ok_or_else(|| Error::DeviceNotFound {
                mac: normalize_mac(mac),
            })
    }

    /// Drop the cached record for a MAC, forcing the next read to refetch.
    pub(crate) fn invalidate(&mut self, mac: &str) {
        self.cache.remove(&normalize_mac(mac));
    }
}
