//! Command-line interface module
//!
//! Provides argument parsing and task execution.

pub mod args;
pub mod commands;

pub use args::{parse_args, parse_args_from, Args, Command};
pub use commands::{execute_command, exit_code};
