//! Gateway reboot command.

use gatemon_api::RebootOutcome;

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;

use super::util;

pub async fn handle(config: &Config, yes: bool, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm(
        "Reboot the gateway? Internet connectivity will drop for a few minutes.",
        yes,
    )? {
        return Ok(());
    }

    let mut client = config::gateway_client_with_login(config)?;

    match client.reboot().await? {
        RebootOutcome::Confirmed => {
            if !global.quiet {
                eprintln!("Reboot command accepted by the gateway.");
            }
        }
        RebootOutcome::Presumed => {
            if !global.quiet {
                eprintln!(
                    "Connection dropped while sending the command; \
                     the gateway is most likely already rebooting."
                );
            }
        }
    }

    Ok(())
}
