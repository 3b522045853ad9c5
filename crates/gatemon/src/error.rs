//! CLI error types with miette diagnostics.
//!
//! Maps `gatemon_api::Error` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use gatemon_api::Error as ApiError;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device")]
    #[diagnostic(
        code(gatemon::connection_failed),
        help(
            "Check that the device is powered on and reachable.\n\
             Cause: {message}"
        )
    )]
    Connection { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(gatemon::timeout),
        help(
            "The device did not answer in time.\n\
             Cause: {message}"
        )
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(gatemon::auth_failed),
        help("Verify the credentials and API key in your config file.")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("No device with MAC '{mac}'")]
    #[diagnostic(
        code(gatemon::device_not_found),
        help("Run: gatemon poe list to see the devices the controller knows.")
    )]
    DeviceNotFound { mac: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing setting: {field}")]
    #[diagnostic(
        code(gatemon::missing_setting),
        help(
            "Set it in the config file or via a GATEMON_ environment variable\n\
             (e.g. GATEMON_POE__API_KEY for poe.api_key)."
        )
    )]
    MissingSetting { field: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(gatemon::config))]
    Config(#[from] figment::Error),

    // ── Everything else ──────────────────────────────────────────────
    #[error("Device error: {message}")]
    #[diagnostic(code(gatemon::device_error))]
    Device { message: String },

    #[error(transparent)]
    #[diagnostic(code(gatemon::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connection { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::MissingSetting { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Device { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidApiKey => Self::AuthFailed {
                message: "API key rejected by the controller".into(),
            },
            ApiError::Forbidden => Self::AuthFailed {
                message: "API key lacks permission for this operation".into(),
            },
            ApiError::Authentication { message } => Self::AuthFailed { message },
            ApiError::DeviceNotFound { mac } => Self::DeviceNotFound { mac },
            ApiError::Transport(e) if e.is_timeout() => Self::Timeout {
                message: e.to_string(),
            },
            ApiError::Transport(e) => Self::Connection {
                message: e.to_string(),
            },
            other => Self::Device {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_map_to_connection_exit_code() {
        let err = CliError::Connection {
            message: "connection refused".into(),
        };
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn device_not_found_maps_through() {
        let err: CliError = ApiError::DeviceNotFound {
            mac: "aa:bb:cc:dd:ee:ff".into(),
        }
        .into();
        assert!(matches!(err, CliError::DeviceNotFound { .. }));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
