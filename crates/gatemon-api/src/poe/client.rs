// Controller HTTP client
//
// Wraps `reqwest::Client` with controller-specific URL construction and
// status-code mapping. Endpoint groups (devices, ports) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::collections::HashMap;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::poe::models::{Envelope, PoeDevice};
use crate::transport::TransportConfig;

/// Async client for a switch controller's network API.
///
/// Site-scoped endpoints live under
/// `https://{host}:{port}/proxy/network/api/s/{site}/`. Authentication is a
/// per-request `X-API-KEY` header, injected as a default header at build
/// time. Each instance owns a MAC-keyed device cache; see `devices.rs` for
/// its invalidation rules.
#[derive(Debug)]
pub struct PoeClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    pub(crate) cache: HashMap<String, PoeDevice>,
}

impl PoeClient {
    /// Create a client for the controller at `host:port`.
    ///
    /// TLS verification follows the transport config; controllers almost
    /// always run self-signed certificates, so the default is permissive.
    pub fn new(
        host: &str,
        port: u16,
        api_key: &SecretString,
        site: String,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Url::parse(&format!("https://{host}:{port}"))?;

        Ok(Self {
            http,
            base_url,
            site,
            cache: HashMap::new(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and base URL.
    ///
    /// Use this when the caller manages auth headers itself (tests do).
    pub fn with_client(http: reqwest::Client, base_url: Url, site: String) -> Self {
        Self {
            http,
            base_url,
            site,
            cache: HashMap::new(),
        }
    }

    /// The configured site identifier.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a site-scoped URL:
    /// `{base}/proxy/network/api/s/{site}/{path}`
    pub(crate) fn site_url(&self, path: &str) -> Url {
        let full = format!(
            "{}/proxy/network/api/s/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.site,
            path
        );
        Url::parse(&full).expect("invalid site URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request and return the body as raw JSON.
    ///
    /// Status mapping: 401 -> [`Error::InvalidApiKey`], 403 ->
    /// [`Error::Forbidden`], any other >= 400 -> [`Error::Api`] with the
    /// body attached. Successful non-JSON bodies degrade to
    /// `{ "raw": text }` rather than an error.
    pub(crate) async fn request_value(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.site_url(path);
        debug!("{method} {url}");

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;

        match status.as_u16() {
            401 => Err(Error::InvalidApiKey),
            403 => Err(Error::Forbidden),
            s if s >= 400 => Err(Error::Api {
                status: s,
                body: text,
            }),
            _ => Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }))),
        }
    }

    /// Send a request and unwrap the `{ meta, data }` envelope.
    ///
    /// Returns `data` on `rc == "ok"`, otherwise [`Error::CommandRejected`]
    /// carrying the envelope message.
    pub(crate) async fn request_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Vec<T>, Error> {
        let value = self.request_value(method, path, body).await?;
        let envelope: Envelope<T> =
            serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: value.to_string(),
            })?;

        if envelope.meta.rc == "ok" {
            Ok(envelope.data)
        } else {
            Err(Error::CommandRejected {
                message: envelope
                    .meta
                    .msg
                    .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
            })
        }
    }
}
