#![allow(clippy::cargo_common_metadata)]
use pdfium_run::{cli, config::Config, setup_logging};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = cli::parse_args();

    // Setup logging based on debug flag
    if let Err(e) = setup_logging(args.debug) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let result = Config::from_args(&args)
        .map_err(anyhow::Error::from)
        .and_then(|config| cli::execute_command(&config, &args.command));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
