//! Command handlers: bridge CLI args to API client calls and format output.

pub mod poe;
pub mod reboot;
pub mod status;
pub mod util;
