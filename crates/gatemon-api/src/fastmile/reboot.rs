// Reboot command issuer
//
// The exact reboot endpoint varies across firmware, so the command is
// issued against an ordered table of candidates, abandoned at the first
// acceptance. A timeout or dropped connection at any step is presumed
// success: a device that has started rebooting stops answering, and the
// two outcomes are indistinguishable on the wire. The distinction is kept
// visible in the result instead of collapsed into one boolean.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::fastmile::client::FastmileClient;

/// How the reboot request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootOutcome {
    /// An endpoint answered with an accepted status code.
    Confirmed,
    /// The connection timed out or dropped mid-chain -- the device is
    /// presumably already rebooting, but no acknowledgement was seen.
    Presumed,
}

/// One candidate endpoint in the fallback chain.
struct RebootAttempt {
    endpoint: &'static str,
    form: &'static [(&'static str, &'static str)],
    accepted: &'static [u16],
}

/// Candidates in order of preference. The primary endpoint matches the web
/// UI; the command and maintenance endpoints cover older firmware.
const REBOOT_ATTEMPTS: &[RebootAttempt] = &[
    RebootAttempt {
        endpoint: "reboot_web_app.cgi",
        form: &[("Page", "REBOOT"), ("Action", "Reboot")],
        accepted: &[200],
    },
    RebootAttempt {
        endpoint: "command_web_app.cgi",
        form: &[("action", "reboot")],
        accepted: &[200, 202, 204],
    },
    RebootAttempt {
        endpoint: "maintenance_web_app.cgi",
        form: &[("action", "reboot"), ("type", "system")],
        accepted: &[200, 202, 204],
    },
];

/// Reboot requests get a longer timeout: the device can take a while to
/// answer while it tears down services.
const REBOOT_TIMEOUT: Duration = Duration::from_secs(30);

impl FastmileClient {
    /// Reboot the gateway.
    ///
    /// Tries each candidate endpoint in order until one accepts. Errors are
    /// returned only when every endpoint actively refused; transport loss
    /// mid-chain is [`RebootOutcome::Presumed`].
    pub async fn reboot(&mut self) -> Result<RebootOutcome, Error> {
        if !self.ensure_session().await {
            warn!("failed to establish session, sending reboot without one");
        }

        let mut last_status = None;

        for attempt in REBOOT_ATTEMPTS {
            debug!(endpoint = attempt.endpoint, "sending reboot command");

            let resp = match self
                .send_form(attempt.endpoint, attempt.form, Some(REBOOT_TIMEOUT))
                .await
            {
                Ok(resp) => resp,
                Err(err) if err.is_transient() => {
                    info!("connection lost or timed out -- device is presumably rebooting");
                    return Ok(RebootOutcome::Presumed);
                }
                Err(err) => return Err(err),
            };

            let status = resp.status().as_u16();
            if attempt.accepted.contains(&status) {
                // Body content only informs the log line; acceptance is
                // decided by the status code alone.
                let body = resp.text().await.unwrap_or_default();
                if body.contains("encrypted=1") {
                    info!(endpoint = attempt.endpoint, "reboot accepted (encrypted response)");
                } else {
                    info!(endpoint = attempt.endpoint, status, "reboot accepted");
                }
                return Ok(RebootOutcome::Confirmed);
            }

            debug!(
                endpoint = attempt.endpoint,
                status, "endpoint refused reboot, trying next candidate"
            );
            last_status = Some(status);
        }

        Err(Error::CommandRejected {
            message: match last_status {
                Some(status) => format!("all reboot endpoints refused (last status {status})"),
                None => "all reboot endpoints refused".into(),
            },
        })
    }
}
