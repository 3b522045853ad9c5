// gatemon-api: Async Rust clients for home-network device APIs.
//
// Two device families are covered: a FastMile-style 5G cellular gateway
// (unauthenticated status snapshot, best-effort login + encrypted payloads,
// multi-endpoint reboot) and a UniFi-style switch controller (PoE port
// overrides and power-cycle commands).

pub mod error;
pub mod fastmile;
pub mod poe;
pub mod transport;

pub use error::Error;
pub use fastmile::{FastmileClient, RebootOutcome};
pub use poe::{PoeClient, PortCycle};
pub use transport::{TlsMode, TransportConfig};
