// Login flow and shared-secret derivation
//
// The gateway's "key exchange" is ad-hoc: the client sends the SHA-256
// digest of a random private value as its public key, and the shared secret
// is SHA-256(private || server_pubkey), falling back to SHA-256(password)
// when the server doesn't offer one. A session is considered established on
// a `sid` cookie, a JSON-embedded `sid`, or a bare HTTP 200. Login failure
// is never fatal -- callers proceed unauthenticated.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::ExposeSecret;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::fastmile::client::FastmileClient;

impl FastmileClient {
    /// `true` once a session id is held from a previous login.
    pub fn has_session(&self) -> bool {
        self.session_id.is_some()
    }

    /// Ensure an active session, logging in once if needed.
    ///
    /// No retry loop: each request path calls this at most once and carries
    /// on without a session when login fails.
    pub async fn ensure_session(&mut self) -> bool {
        if self.session_id.is_some() {
            return true;
        }
        self.login().await
    }

    /// Authenticate against `login_web_app.cgi`.
    ///
    /// Returns `false` on a non-200 status or transport failure, with the
    /// cause logged. Session and secret state on the client is updated as a
    /// side effect; credentials are regenerated per attempt and never stored
    /// beyond this instance.
    pub async fn login(&mut self) -> bool {
        let (private_key, public_key) = generate_key_pair();
        let pubkey_b64 = URL_SAFE_NO_PAD.encode(public_key);

        let form = [
            ("name", self.username.as_str()),
            ("pswd", self.password.expose_secret()),
            ("pubkey", pubkey_b64.as_str()),
        ];

        let resp = match self.send_form("login_web_app.cgi", &form, None).await {
            Ok(resp) => resp,
            Err(err) => {
                error!("login request failed: {err}");
                return false;
            }
        };

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            error!("login failed with status {status}");
            return false;
        }

        let sid_cookie = resp
            .cookies()
            .find(|c| c.name() == "sid")
            .map(|c| c.value().to_owned());
        let body = resp.text().await.unwrap_or_default();
        let json: Option<Value> = serde_json::from_str(&body).ok();

        if let Some(sid) = sid_cookie {
            debug!("login successful, session id from cookie");
            self.session_id = Some(sid);

            // Prefer a server-supplied public key; otherwise fall back to a
            // password-derived secret so encrypted responses stay readable.
            self.shared_secret = json
                .as_ref()
                .and_then(|v| v.get("pubkey"))
                .and_then(Value::as_str)
                .and_then(|pk| derive_shared_secret(&private_key, pk))
                .or_else(|| Some(sha256(self.password.expose_secret().as_bytes())));

            return true;
        }

        if let Some(sid) = json
            .as_ref()
            .and_then(|v| v.get("sid"))
            .and_then(Value::as_str)
        {
            debug!("login successful, session id from response body");
            self.cookie_jar
                .add_cookie_str(&format!("sid={sid}"), self.base_url());
            self.session_id = Some(sid.to_owned());
            return true;
        }

        // Some firmware sets no explicit session marker; the cookie jar may
        // still carry whatever the device sent.
        debug!("login returned 200, proceeding without explicit session");
        true
    }
}

/// Generate the ad-hoc key pair: 32 random bytes and their SHA-256 digest.
fn generate_key_pair() -> ([u8; 32], [u8; 32]) {
    let mut private_key = [0u8; 32];
    OsRng.fill_bytes(&mut private_key);
    (private_key, sha256(&private_key))
}

/// SHA-256(private || base64-decoded server public key), or `None` when the
/// server value doesn't decode.
fn derive_shared_secret(private_key: &[u8; 32], server_pubkey: &str) -> Option<[u8; 32]> {
    let server_key = STANDARD.decode(server_pubkey).ok()?;
    let mut hasher = Sha256::new();
    hasher.update(private_key);
    hasher.update(&server_key);
    Some(hasher.finalize().into())
}

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}
