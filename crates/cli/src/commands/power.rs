//! Power Commands

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::output::print_info;
use vyconsole_common::{Console, PowerAction};

#[derive(Subcommand)]
pub enum PowerCommands {
    /// Reboot an instance
    Reboot(PowerArgs),

    /// Power off an instance
    Poweroff(PowerArgs),
}

#[derive(Args)]
pub struct PowerArgs {
    /// Instance ID
    #[arg(long)]
    instance: String,

    /// Skip the confirmation guard
    #[arg(long)]
    yes: bool,
}

pub async fn execute(cmd: PowerCommands, console: &Console) -> Result<()> {
    let (action, args) = match cmd {
        PowerCommands::Reboot(args) => (PowerAction::Reboot, args),
        PowerCommands::Poweroff(args) => (PowerAction::Poweroff, args),
    };

    if !args.yes {
        bail!("refusing to {} {} without --yes", action, args.instance);
    }

    // Power actions target the connected instance.
    console.connect(&args.instance).await?;
    let response = console.power(action).await?;
    if let Some(message) = response.get("message").and_then(|m| m.as_str()) {
        print_info(message);
    }

    Ok(())
}
