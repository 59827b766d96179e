//! Command-line argument parsing

use clap::{
    Parser, Subcommand,
    error::{ContextKind, ContextValue, ErrorKind},
};
use std::ffi::OsString;
use std::path::PathBuf;

/// pypdfium2 task runner - test, document, lint, clean and package the project
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "run", arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Project root; every tool runs from here
    #[arg(short = 'C', long = "root", default_value = ".")]
    pub root: PathBuf,

    /// Python interpreter used for module and script invocations
    #[arg(long, env = "RUN_PYTHON", default_value = "python3")]
    pub python: String,

    /// Task to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available tasks
///
/// Forwarding tasks disable their own help flag so that `--help` and
/// friends reach the wrapped tool.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the test suite
    #[command(disable_help_flag = true)]
    Test {
        /// Arguments passed on to pytest
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the test suite under coverage and print a report
    #[command(disable_help_flag = true)]
    Coverage {
        /// Arguments passed on to pytest
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Render the HTML documentation
    #[command(name = "docs-build", disable_help_flag = true)]
    DocsBuild {
        /// Arguments passed on to sphinx
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Open the rendered documentation in the default viewer
    #[command(name = "docs-open", disable_help_flag = true)]
    DocsOpen {
        /// Arguments passed on to the viewer
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the unused-import, spelling and license-header checks
    Check {
        /// Accepted and ignored
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        args: Vec<String>,
    },

    /// Remove build artifacts
    Clean {
        /// Accepted and ignored
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        args: Vec<String>,
    },

    /// Clean, check, fetch binaries, craft and verify packages
    Packaging {
        /// Accepted and ignored
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        args: Vec<String>,
    },

    /// Build PDFium from source
    #[command(disable_help_flag = true)]
    Build {
        /// Arguments passed on to the build script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Place a prebuilt PDFium binary into the source tree
    #[command(disable_help_flag = true)]
    Emplace {
        /// Arguments passed on to the emplace script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Any other name
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Args {
    /// Arguments for a word that names no task
    fn unknown(word: String) -> Self {
        Self {
            debug: false,
            dry_run: false,
            root: PathBuf::from("."),
            python: "python3".to_string(),
            command: Command::Unknown(vec![word]),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

/// Parse an explicit argument list
///
/// A leading word that looks like a flag but is not one of the runner's own
/// is treated as an unknown task name rather than a usage error.
pub fn parse_args_from<I, T>(argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Err(err) if err.kind() == ErrorKind::UnknownArgument => {
            match err.get(ContextKind::InvalidArg) {
                Some(ContextValue::String(word)) => Ok(Args::unknown(word.clone())),
                _ => Err(err),
            }
        }
        parsed => parsed,
    }
}
