// PoE switch controller client modules
//
// Hand-written client for the controller's network API under
// `/proxy/network/api/s/{site}/`, authenticated with an `X-API-KEY` header.
// Reads go through a MAC-keyed device cache; every mutation invalidates the
// cached device before and after to force fresh reads.

pub mod client;
pub mod devices;
pub mod models;
pub mod ports;

pub use client::PoeClient;
pub use devices::ConnectionTest;
pub use models::{PoeDevice, PortEntry, PortOverride, normalize_mac};
pub use ports::{DEFAULT_CYCLE_DELAY, PortCycle};
