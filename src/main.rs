//! BOLT FIT CLI

use std::{io, process::ExitCode};

use boltfit::{cli::Cli, observability};
use clap::Parser;
use tracing::error;

fn main() -> ExitCode {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();

    match cli.run(&mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");

            #[expect(clippy::print_stderr, reason = "user-facing command error")]
            {
                eprintln!("error: {err}");
            }

            ExitCode::FAILURE
        }
    }
}
