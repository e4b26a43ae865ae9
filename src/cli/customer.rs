use std::io;

use clap::{Args, Subcommand};

use crate::{config::Config, customers::CustomerProfile};

use super::CliError;

#[derive(Debug, Args)]
pub(crate) struct CustomerCommand {
    #[command(subcommand)]
    command: CustomerSubcommand,
}

#[derive(Debug, Subcommand)]
enum CustomerSubcommand {
    /// Print the saved details
    Show,

    /// Delete the saved details
    Forget,
}

pub(super) fn run(
    config: &Config,
    command: &CustomerCommand,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let mut profile = CustomerProfile::load(config.storage.storage());

    match command.command {
        CustomerSubcommand::Show => {
            if !profile.is_returning() {
                writeln!(out, "No saved details.")?;
                return Ok(());
            }

            let details = profile.details();

            writeln!(out, "name: {}", details.name)?;
            writeln!(out, "phone: {}", details.phone)?;
            writeln!(out, "email: {}", details.email)?;
            writeln!(out, "address: {}", details.address)?;
            writeln!(out, "city: {}", details.city)?;
            writeln!(out, "state: {}", details.state)?;
            writeln!(out, "pincode: {}", details.pincode)?;
        }
        CustomerSubcommand::Forget => {
            profile.forget()?;
            writeln!(out, "Saved details removed.")?;
        }
    }

    Ok(())
}
