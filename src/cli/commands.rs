//! Command implementations for the CLI

use crate::{
    cli::Command,
    config::Config,
    core::{Action, Dispatcher},
    error::RunnerError,
};
use anyhow::Context;
use tracing::{info, instrument};

/// Execute the appropriate task based on CLI arguments
#[instrument(skip(config))]
pub fn execute_command(config: &Config, command: &Command) -> anyhow::Result<()> {
    let (action, extra) = match command {
        Command::Test { args } => (Action::Test, args),
        Command::Coverage { args } => (Action::Coverage, args),
        Command::DocsBuild { args } => (Action::DocsBuild, args),
        Command::DocsOpen { args } => (Action::DocsOpen, args),
        Command::Check { args } => (Action::Check, args),
        Command::Clean { args } => (Action::Clean, args),
        Command::Packaging { args } => (Action::Packaging, args),
        Command::Build { args } => (Action::Build, args),
        Command::Emplace { args } => (Action::Emplace, args),
        Command::Unknown(words) => {
            report_unknown(words);
            return Ok(());
        }
    };

    execute_action(config, action, extra)
}

/// Run one task through the dispatcher
#[instrument(skip(config, extra))]
fn execute_action(config: &Config, action: Action, extra: &[String]) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::new(config.clone());
    dispatcher
        .dispatch(action, extra)
        .with_context(|| format!("Task {action} failed"))?;

    info!("Task {} completed successfully", action);
    Ok(())
}

/// Print the diagnostic for a name that is not a task
fn report_unknown(words: &[String]) {
    let name = words.first().map_or("", String::as_str);
    println!("Unknown command: {name}");
}

/// Exit status for an error returned by [`execute_command`]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RunnerError>()
        .map_or(1, RunnerError::exit_code)
}
