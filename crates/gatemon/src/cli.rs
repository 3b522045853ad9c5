//! Clap argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gatemon",
    version,
    about = "Monitor and control a FastMile 5G gateway and its PoE switch"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the gateway status snapshot
    Status {
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reboot the gateway
    Reboot {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// PoE switch operations
    Poe(PoeArgs),
}

#[derive(Debug, Args)]
pub struct PoeArgs {
    #[command(subcommand)]
    pub command: PoeCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoeCommand {
    /// List PoE-capable devices and their ports
    List,

    /// Set the PoE mode of a port
    Set {
        /// Switch MAC address
        mac: String,
        /// Port number
        port_idx: u32,
        /// PoE mode (auto, pasv24, off)
        mode: String,
    },

    /// Power-cycle a PoE port
    Restart {
        /// Switch MAC address
        mac: String,
        /// Port number
        port_idx: u32,
        /// Seconds between off and on when falling back to a manual cycle
        #[arg(long, default_value_t = 5)]
        delay: u64,
    },
}
