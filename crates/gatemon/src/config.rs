//! CLI-owned configuration: one TOML file plus environment overrides, and
//! translation into API clients.
//!
//! ```toml
//! [gateway]
//! host = "192.168.192.1"
//! username = "admin"
//! password = "..."        # prompted for when absent
//!
//! [poe]
//! host = "192.168.1.1"
//! port = 443
//! api_key = "..."
//! site = "default"
//! verify_tls = false
//! ```
//!
//! Environment variables override the file with a `GATEMON_` prefix and `__`
//! as the section separator, e.g. `GATEMON_POE__API_KEY`.

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use gatemon_api::{FastmileClient, PoeClient, TlsMode, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub poe: PoeConfig,
}

/// Cellular gateway connection settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Prompted for interactively when absent and a login is needed.
    pub password: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            username: default_username(),
            password: None,
        }
    }
}

/// PoE switch controller settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct PoeConfig {
    /// Controller host. Required for `poe` subcommands.
    pub host: Option<String>,

    #[serde(default = "default_poe_port")]
    pub port: u16,

    /// Controller API key. Required for `poe` subcommands.
    pub api_key: Option<String>,

    #[serde(default = "default_site")]
    pub site: String,

    /// Verify the controller's TLS certificate (most run self-signed).
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for PoeConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_poe_port(),
            api_key: None,
            site: default_site(),
            verify_tls: false,
        }
    }
}

fn default_gateway_host() -> String {
    "192.168.192.1".into()
}
fn default_username() -> String {
    "admin".into()
}
fn default_poe_port() -> u16 {
    443
}
fn default_site() -> String {
    "default".into()
}

// ── Config loading ───────────────────────────────────────────────────

/// Resolve the config file path: `--config` flag, else platform config dir.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    if let Some(ref path) = global.config {
        return path.clone();
    }

    ProjectDirs::from("com", "gatemon", "gatemon")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("gatemon");
            p.push("config.toml");
            p
        })
}

/// Load the config from defaults, file, and environment (in that order).
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("GATEMON_").split("__"));

    Ok(figment.extract()?)
}

// ── Client construction ──────────────────────────────────────────────

/// Gateway client for unauthenticated reads. Never prompts; the status
/// endpoint works without a login.
pub fn gateway_client(config: &Config) -> Result<FastmileClient, CliError> {
    build_gateway_client(config, config.gateway.password.clone().unwrap_or_default())
}

/// Gateway client for command paths that attempt a login. Prompts for the
/// password when the config doesn't carry one.
pub fn gateway_client_with_login(config: &Config) -> Result<FastmileClient, CliError> {
    let password = match config.gateway.password.clone() {
        Some(p) => p,
        None => rpassword::prompt_password(format!(
            "Password for {}@{}: ",
            config.gateway.username, config.gateway.host
        ))?,
    };
    build_gateway_client(config, password)
}

fn build_gateway_client(config: &Config, password: String) -> Result<FastmileClient, CliError> {
    FastmileClient::new(
        &config.gateway.host,
        config.gateway.username.clone(),
        SecretString::from(password),
        &TransportConfig::default(),
    )
    .map_err(CliError::from)
}

/// PoE controller client from the `[poe]` section.
pub fn poe_client(config: &Config) -> Result<PoeClient, CliError> {
    let host = config.poe.host.clone().ok_or_else(|| CliError::MissingSetting {
        field: "poe.host".into(),
    })?;
    let api_key = config.poe.api_key.clone().ok_or_else(|| CliError::MissingSetting {
        field: "poe.api_key".into(),
    })?;

    let tls = if config.poe.verify_tls {
        TlsMode::System
    } else {
        TlsMode::DangerAcceptInvalid
    };
    let transport = TransportConfig {
        tls,
        ..TransportConfig::default()
    };

    PoeClient::new(
        &host,
        config.poe.port,
        &SecretString::from(api_key),
        config.poe.site.clone(),
        &transport,
    )
    .map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_with_config(path: PathBuf) -> GlobalOpts {
        GlobalOpts {
            verbose: 0,
            config: Some(path),
            quiet: false,
        }
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let global = global_with_config(dir.path().join("missing.toml"));

        let config = load_config(&global).unwrap();
        assert_eq!(config.gateway.host, "192.168.192.1");
        assert_eq!(config.gateway.username, "admin");
        assert_eq!(config.poe.port, 443);
        assert_eq!(config.poe.site, "default");
        assert!(!config.poe.verify_tls);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[gateway]
host = "10.0.0.1"

[poe]
host = "10.0.0.2"
api_key = "k"
port = 8443
"#,
        )
        .unwrap();

        let config = load_config(&global_with_config(path)).unwrap();
        assert_eq!(config.gateway.host, "10.0.0.1");
        assert_eq!(config.gateway.username, "admin");
        assert_eq!(config.poe.host.as_deref(), Some("10.0.0.2"));
        assert_eq!(config.poe.port, 8443);
    }

    #[test]
    fn poe_client_requires_host_and_key() {
        let config = Config::default();
        let err = poe_client(&config).unwrap_err();
        assert!(matches!(err, CliError::MissingSetting { .. }));
    }
}
