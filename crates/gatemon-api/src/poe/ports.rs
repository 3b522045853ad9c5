// PoE port mutations
//
// Both operations are read-modify-write cycles against the device record:
// the cached entry is invalidated before the read and after the write so no
// decision is made on stale data. The port restart prefers the controller's
// atomic power-cycle command and falls back to an explicit off/wait/on
// sequence when the controller refuses it.

use std::time::Duration;

use reqwest::Method;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::poe::client::PoeClient;
use crate::poe::models::{PortOverride, normalize_mac};

/// How a PoE port restart was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCycle {
    /// The controller's atomic `power-cycle` command was accepted.
    Native,
    /// Manual fallback: PoE off, fixed wait, previous mode restored.
    Manual,
}

/// Wall-clock pause between "off" and "on" in the manual fallback.
pub const DEFAULT_CYCLE_DELAY: Duration = Duration::from_secs(5);

impl PoeClient {
    /// Set the PoE mode of one port.
    ///
    /// Refetches the device, copies its override list, finds or creates the
    /// entry for `port_idx`, sets `poe_mode`, and PUTs the whole list back
    /// to `rest/device/{id}`. New entries inherit the device's last
    /// connection network id and forward all traffic; existing entries keep
    /// every other field untouched.
    pub async fn set_port_poe_mode(
        &mut self,
        mac: &str,
        port_idx: u32,
        mode: &str,
    ) -> Result<(), Error> {
        self.invalidate(mac);
        let device = self.require_device(mac).await?;

        let default_network_id = device.last_connection_network_id.clone().unwrap_or_default();
        let mut overrides = device.port_overrides.clone();

        match overrides.iter_mut().find(|o| o.port_idx == port_idx) {
            Some(entry) => entry.poe_mode = Some(mode.to_owned()),
            None => overrides.push(PortOverride {
                port_idx,
                poe_mode: Some(mode.to_owned()),
                native_networkconf_id: Some(default_network_id),
                forward: Some("all".to_owned()),
                extra: serde_json::Map::new(),
            }),
        }

        debug!(mac, port_idx, mode, "updating port overrides");
        let body = json!({ "port_overrides": overrides });
        self.request_value(
            Method::PUT,
            &format!("rest/device/{}", device.id),
            Some(&body),
        )
        .await?;

        self.invalidate(mac);
        Ok(())
    }

    /// Restart PoE on one port.
    ///
    /// Tries `cmd/devmgr` `power-cycle` first (a ~2s cycle on the switch
    /// itself). When the controller reports anything but `rc == "ok"`, or
    /// the command errors outright, falls back to disabling PoE, sleeping
    /// `delay`, and restoring the mode observed in the port table
    /// beforehand (`"auto"` when none was visible). Any failing fallback
    /// step short-circuits with its error.
    pub async fn restart_poe_port(
        &mut self,
        mac: &str,
        port_idx: u32,
        delay: Duration,
    ) -> Result<PortCycle, Error> {
        let mac_normalized = normalize_mac(mac);
        info!(mac = %mac_normalized, port_idx, "power cycling PoE port");

        let command = json!({
            "cmd": "power-cycle",
            "mac": mac_normalized,
            "port_idx": port_idx,
        });

        match self
            .request_value(Method::POST, "cmd/devmgr", Some(&command))
            .await
        {
            Ok(result) => {
                if result.pointer("/meta/rc").and_then(Value::as_str) == Some("ok") {
                    info!(port_idx, "power-cycle command accepted");
                    return Ok(PortCycle::Native);
                }
                warn!(
                    msg = result
                        .pointer("/meta/msg")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("unknown"),
                    "power-cycle command not accepted, falling back to manual cycle"
                );
            }
            Err(err) => {
                warn!("power-cycle command failed: {err}, falling back to manual cycle");
            }
        }

        // Manual off/wait/on cycle. Read the current mode first so the port
        // comes back in the state it was actually running, not the default.
        self.invalidate(mac);
        let device = self.require_device(mac).await?;
        let current_mode = device
            .port_table
            .iter()
            .find(|p| p.port_idx == port_idx)
            .and_then(|p| p.poe_mode.clone())
            .unwrap_or_else(|| "auto".to_owned());

        info!(port_idx, "disabling PoE");
        self.set_port_poe_mode(mac, port_idx, "off").await?;

        debug!(delay_secs = delay.as_secs_f64(), "waiting before re-enabling PoE");
        tokio::time::sleep(delay).await;

        info!(port_idx, mode = %current_mode, "re-enabling PoE");
        self.set_port_poe_mode(mac, port_idx, &current_mode).await?;

        Ok(PortCycle::Manual)
    }
}
