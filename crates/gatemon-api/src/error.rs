use thiserror::Error;

/// Top-level error type for the `gatemon-api` crate.
///
/// Covers both device families. Callers are expected to catch these at
/// their boundary and degrade to a logged outcome; nothing in this crate
/// panics on a misbehaving device.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, rejected session, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// API key rejected by the controller (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// API key lacks permission for the operation (HTTP 403).
    #[error("Access forbidden -- check API key permissions")]
    Forbidden,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller API ──────────────────────────────────────────────
    /// Controller-reported error (HTTP status >= 400), with the body
    /// for diagnostics.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Command rejected by the device: every candidate endpoint refused,
    /// or the response envelope reported failure.
    #[error("Command rejected: {message}")]
    CommandRejected { message: String },

    /// No device with the given MAC is known to the controller.
    #[error("Device not found: {mac}")]
    DeviceNotFound { mac: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the underlying failure is a timeout or a refused
    /// or dropped connection.
    ///
    /// The gateway reboot path treats these as presumed success: a device
    /// that is already rebooting stops answering.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
