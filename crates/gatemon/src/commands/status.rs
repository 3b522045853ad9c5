//! Gateway status command.

use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use gatemon_api::fastmile::format_uptime;
use gatemon_api::fastmile::status::CellStats;

use crate::config::{self, Config};
use crate::error::CliError;

pub async fn handle(config: &Config, json: bool) -> Result<(), CliError> {
    let client = config::gateway_client(config)?;
    let snapshot = client.get_prelogin_status().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).expect("snapshot is serializable")
        );
        return Ok(());
    }

    // ── Device ───────────────────────────────────────────────────────
    println!("Gateway");
    if let Some(info) = snapshot.device_info() {
        let model = match (&info.model_name, &info.vendor) {
            (Some(model), Some(vendor)) => format!("{model} ({vendor})"),
            (Some(model), None) => model.clone(),
            _ => "unknown".into(),
        };
        println!("  Model:     {model}");
        println!("  Serial:    {}", opt(&info.serial_number));
        println!("  Software:  {}", opt(&info.software_version));
        if let Some(uptime) = info.uptime {
            println!("  Uptime:    {}", format_uptime(uptime));
        }
    } else {
        println!("  (no device_info section in the snapshot)");
    }

    // ── WAN ──────────────────────────────────────────────────────────
    println!();
    println!("WAN");
    match snapshot.wan_info().and_then(|w| w.connection) {
        Some(conn) => {
            println!("  Status:    {}", opt(&conn.connection_status));
            println!("  IP:        {}", opt(&conn.external_ip_address));
            println!("  Gateway:   {}", opt(&conn.default_gateway));
            println!("  DNS:       {}", opt(&conn.dns_servers));
        }
        None => println!("  (no WAN connection reported)"),
    }

    // ── Cellular ─────────────────────────────────────────────────────
    println!();
    println!("Cellular");
    let cell = snapshot.cellular_stats();
    match (cell.five_g, cell.lte) {
        (None, None) => println!("  (no radio statistics reported)"),
        (five_g, lte) => {
            if let Some(stats) = five_g {
                println!("  5G:   {}", radio_line(stats));
            }
            if let Some(stats) = lte {
                println!("  LTE:  {}", radio_line(stats));
            }
        }
    }

    // ── Connected devices ────────────────────────────────────────────
    let devices = snapshot.connected_devices();
    if !devices.is_empty() {
        let rows: Vec<DeviceRow> = devices
            .iter()
            .map(|d| DeviceRow {
                host: opt(&d.host_name),
                ip: opt(&d.ip_address),
                mac: opt(&d.mac_address),
                interface: opt(&d.interface_type),
                active: match d.active {
                    Some(0) => "no".into(),
                    Some(_) => "yes".into(),
                    None => "-".into(),
                },
            })
            .collect();

        println!();
        println!("Connected devices");
        println!("{}", Table::new(&rows).with(Style::rounded()));
    }

    Ok(())
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Active")]
    active: String,
}

fn radio_line(stats: &CellStats) -> String {
    format!(
        "RSRP {}  RSRQ {}  SNR {}  bars {}",
        show(stats.rsrp.as_ref()),
        show(stats.rsrq.as_ref()),
        show(stats.snr.as_ref()),
        show(stats.signal_strength_level.as_ref()),
    )
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".into())
}

/// Render a raw JSON value for display: strings unquoted, anything else in
/// its JSON form, `-` for absent.
fn show(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "-".into(),
    }
}
