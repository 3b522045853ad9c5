// Encrypted-payload handling
//
// Some firmware answers with `encrypted=1&ct=<b64url>&ck=<b64url>` instead
// of JSON. The blob layout is `IV (12) || ciphertext || tag (16)` under
// AES-256-GCM, with the key material shipped alongside in `ck`. This is the
// device's own scheme, not a security boundary; failures read as "no data".

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde_json::Value;
use tracing::debug;

use crate::fastmile::client::FastmileClient;

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Decode base64url, tolerating both padded and unpadded input.
fn b64_decode(input: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(input.trim_end_matches('=')).ok()
}

/// Pull a `name=value` token out of a raw response body.
///
/// Values end at `&`, whitespace, or any of `extra_stops` (the device
/// appends a `.` after `ck` on some firmware).
fn extract_param<'a>(text: &'a str, name: &str, extra_stops: &[char]) -> Option<&'a str> {
    let needle = format!("{name}=");
    let start = text.find(&needle)? + needle.len();
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c == '&' || c.is_whitespace() || extra_stops.contains(&c))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

/// Decrypt a `ct`/`ck` pair.
///
/// The key is the first 32 bytes of the decoded `ck`; the decoded `ct` blob
/// is `IV || ciphertext || tag`. Any failure (bad base64, short blob, GCM
/// tag mismatch, non-JSON plaintext) is logged at debug and yields `None`.
pub fn decrypt_response(ct: &str, ck: &str) -> Option<Value> {
    let blob = b64_decode(ct)?;
    let key_material = b64_decode(ck)?;

    if blob.len() <= IV_LEN + TAG_LEN || key_material.len() < KEY_LEN {
        debug!("encrypted payload too short to decrypt");
        return None;
    }

    let cipher = match Aes256Gcm::new_from_slice(&key_material[..KEY_LEN]) {
        Ok(cipher) => cipher,
        Err(err) => {
            debug!("failed to build cipher: {err}");
            return None;
        }
    };

    let nonce = Nonce::from_slice(&blob[..IV_LEN]);
    let plaintext = match cipher.decrypt(nonce, &blob[IV_LEN..]) {
        Ok(plaintext) => plaintext,
        Err(_) => {
            debug!("failed to decrypt response payload");
            return None;
        }
    };

    match serde_json::from_slice(&plaintext) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("decrypted payload is not JSON: {err}");
            None
        }
    }
}

/// Parse and decrypt an `encrypted=1&ct=...&ck=...` response body.
///
/// Returns `None` when the body is not tagged as encrypted or the tokens
/// are missing or undecryptable.
pub fn parse_encrypted_response(text: &str) -> Option<Value> {
    if !text.contains("encrypted=1") {
        return None;
    }

    let ct = extract_param(text, "ct", &[])?;
    let ck = extract_param(text, "ck", &['.'])?;
    decrypt_response(ct, ck)
}

/// Encrypt a JSON payload under `secret`, producing `(ct, ck)` tokens in
/// the device's wire format (unpadded base64url).
pub fn encrypt_payload(secret: &[u8; KEY_LEN], payload: &Value) -> Option<(String, String)> {
    let cipher = Aes256Gcm::new_from_slice(secret).ok()?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let plaintext = payload.to_string();
    let sealed = match cipher.encrypt(nonce, plaintext.as_bytes()) {
        Ok(sealed) => sealed,
        Err(_) => {
            debug!("failed to encrypt payload");
            return None;
        }
    };

    let mut blob = Vec::with_capacity(IV_LEN + sealed.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&sealed);

    Some((URL_SAFE_NO_PAD.encode(blob), URL_SAFE_NO_PAD.encode(secret)))
}

impl FastmileClient {
    /// Encrypt a payload with the session's shared secret.
    ///
    /// `None` when no login has established a secret yet or sealing fails.
    pub fn encrypt_payload(&self, payload: &Value) -> Option<(String, String)> {
        let secret = self.shared_secret.as_ref()?;
        encrypt_payload(secret, payload)
    }

    /// Decrypt a raw response body if it carries an encrypted payload.
    pub fn decrypt_body(&self, text: &str) -> Option<Value> {
        parse_encrypted_response(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrip_through_wire_format() {
        let secret = [7u8; 32];
        let payload = json!({ "Page": "REBOOT", "status": "ok" });

        let (ct, ck) = encrypt_payload(&secret, &payload).expect("encrypt");
        let body = format!("encrypted=1&ct={ct}&ck={ck}.");

        assert_eq!(parse_encrypted_response(&body), Some(payload));
    }

    #[test]
    fn tampered_ciphertext_reads_as_absent() {
        let secret = [7u8; 32];
        let (ct, ck) = encrypt_payload(&secret, &json!({ "x": 1 })).expect("encrypt");

        // Flip the first ciphertext character (after the encoded IV).
        let mut tampered: Vec<char> = ct.chars().collect();
        let idx = 20;
        tampered[idx] = if tampered[idx] == 'A' { 'B' } else { 'A' };
        let tampered: String = tampered.into_iter().collect();

        assert_eq!(decrypt_response(&tampered, &ck), None);
    }

    #[test]
    fn padded_tokens_decode() {
        let secret = [9u8; 32];
        let (ct, ck) = encrypt_payload(&secret, &json!({ "k": "v" })).expect("encrypt");

        assert!(decrypt_response(&format!("{ct}=="), &format!("{ck}=")).is_some());
    }

    #[test]
    fn untagged_body_is_not_parsed() {
        assert_eq!(parse_encrypted_response("ct=abc&ck=def"), None);
    }

    #[test]
    fn token_extraction_stops_at_delimiters() {
        assert_eq!(extract_param("encrypted=1&ct=abc-_12&ck=xyz", "ct", &[]), Some("abc-_12"));
        assert_eq!(extract_param("ck=xyz.rest", "ck", &['.']), Some("xyz"));
        assert_eq!(extract_param("ct=abc def", "ct", &[]), Some("abc"));
        assert_eq!(extract_param("nothing here", "ct", &[]), None);
    }
}
