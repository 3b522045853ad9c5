// FastMile cellular gateway client modules
//
// Hand-written client for the gateway's CGI endpoints. Status reads are
// unauthenticated; the login + encrypted-payload path is best-effort and
// explicitly not a security boundary (the device derives keys from ad-hoc
// SHA-256 hashing, not a vetted key exchange).

pub mod client;
pub mod crypto;
pub mod reboot;
pub mod session;
pub mod status;

pub use client::{FastmileClient, ResponseBody};
pub use reboot::RebootOutcome;
pub use status::{StatusSnapshot, format_uptime};
