// Gateway HTTP client
//
// Wraps `reqwest::Client` with the gateway's conventions: CGI endpoints off
// a plain-HTTP base URL, `application/x-www-form-urlencoded` request bodies,
// and responses that are sometimes JSON and sometimes raw text. Session and
// crypto state lives here; the login flow itself is in `session.rs`.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// A gateway response body, normalized.
///
/// The device answers some endpoints with JSON and others with raw text
/// (including the `encrypted=1&ct=...&ck=...` form). Callers that need
/// structured data match on `Json`; everything else stays available as text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    pub(crate) fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(text),
        }
    }

    /// The parsed JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// The raw text, if the body was not JSON.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Raw(text) => Some(text),
        }
    }
}

/// Async client for a FastMile 5G gateway.
///
/// One instance per device. The instance owns its cookie jar, so a session
/// cookie obtained by [`login`](Self::login) is attached to every later
/// request automatically.
pub struct FastmileClient {
    http: reqwest::Client,
    base_url: Url,
    pub(crate) cookie_jar: std::sync::Arc<reqwest::cookie::Jar>,
    pub(crate) username: String,
    pub(crate) password: SecretString,
    pub(crate) session_id: Option<String>,
    pub(crate) shared_secret: Option<[u8; 32]>,
}

impl FastmileClient {
    /// Create a client for the gateway at `host` (e.g. `192.168.192.1`).
    ///
    /// A cookie jar is added to the transport if the config doesn't already
    /// carry one; the gateway's session handling is cookie-based.
    pub fn new(
        host: &str,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config
            .cookie_jar
            .clone()
            .unwrap_or_else(|| std::sync::Arc::new(reqwest::cookie::Jar::default()));
        let http = config.build_client()?;
        let base_url = Url::parse(&format!("http://{host}/"))?;

        Ok(Self {
            http,
            base_url,
            cookie_jar,
            username,
            password,
            session_id: None,
            shared_secret: None,
        })
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and normalize the body.
    ///
    /// Non-2xx statuses map to [`Error::Api`]; transport failures map to
    /// [`Error::Transport`]. Nothing here inspects the payload beyond the
    /// JSON-or-raw split.
    pub async fn get(&self, endpoint: &str) -> Result<ResponseBody, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::normalize(resp).await
    }

    /// Send a form-encoded POST request and normalize the body.
    pub async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<ResponseBody, Error> {
        let resp = self.send_form(endpoint, form, None).await?;
        Self::normalize(resp).await
    }

    /// Send a form-encoded POST and hand back the raw response.
    ///
    /// Used by the login and reboot paths, which need to inspect status
    /// codes and cookies before deciding what the body means.
    pub(crate) async fn send_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("POST {url}");

        let mut req = self
            .http
            .post(url)
            .header("Accept", "application/json, text/plain, */*")
            .form(form);
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        req.send().await.map_err(Error::Transport)
    }

    async fn normalize(resp: reqwest::Response) -> Result<ResponseBody, Error> {
        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(ResponseBody::from_text(text))
    }
}
