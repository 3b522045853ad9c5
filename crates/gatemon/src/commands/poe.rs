//! PoE switch command handlers.

use std::time::Duration;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use gatemon_api::PortCycle;

use crate::cli::{GlobalOpts, PoeArgs, PoeCommand};
use crate::config::{self, Config};
use crate::error::CliError;

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Power (W)")]
    power: String,
}

pub async fn handle(config: &Config, args: PoeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut client = config::poe_client(config)?;

    match args.command {
        PoeCommand::List => {
            let probe = client.test_connection().await?;

            let rows: Vec<PortRow> = probe
                .poe_devices
                .iter()
                .flat_map(|device| {
                    device.poe_ports.iter().map(|port| PortRow {
                        device: device.name.clone(),
                        mac: device.mac.clone(),
                        model: device.model.clone(),
                        port: port.port_idx,
                        name: port.name.clone(),
                        mode: port.poe_mode.clone(),
                        power: port.poe_power.clone(),
                    })
                })
                .collect();

            if rows.is_empty() {
                eprintln!(
                    "No PoE-capable ports found ({} devices visible to the controller).",
                    probe.device_count
                );
                return Ok(());
            }

            println!("{}", Table::new(&rows).with(Style::rounded()));
            Ok(())
        }

        PoeCommand::Set {
            mac,
            port_idx,
            mode,
        } => {
            client.set_port_poe_mode(&mac, port_idx, &mode).await?;
            if !global.quiet {
                eprintln!("Port {port_idx} on {mac} set to '{mode}'.");
            }
            Ok(())
        }

        PoeCommand::Restart {
            mac,
            port_idx,
            delay,
        } => {
            let cycle = client
                .restart_poe_port(&mac, port_idx, Duration::from_secs(delay))
                .await?;
            if !global.quiet {
                match cycle {
                    PortCycle::Native => {
                        eprintln!("Port {port_idx} power-cycled by the switch.");
                    }
                    PortCycle::Manual => {
                        eprintln!(
                            "Port {port_idx} cycled manually: PoE off, {delay}s wait, \
                             previous mode restored."
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
