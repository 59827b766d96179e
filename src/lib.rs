//! # pypdfium2 task runner
//!
//! Maps a task name to a fixed sequence of external tool invocations and
//! runs them from the project root: tests, coverage, docs, lint checks,
//! cleanup, packaging and the native library helpers.
//!
//! ## Features
//!
//! - Task table kept as data: each task expands to an ordered list of steps
//! - Trailing arguments forwarded verbatim to the wrapped tool
//! - Multi-step tasks stop at the first failing tool and exit with its status
//! - Every command echoed before it runs, or only echoed with `--dry-run`
//!
//! ## Example
//!
//! ```no_run
//! use pdfium_run::{config::Config, core::{Action, Dispatcher}};
//!
//! let dispatcher = Dispatcher::new(Config::default());
//! dispatcher.dispatch(Action::Test, &["-x".to_string()])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
///
/// Log lines go to stderr; stdout belongs to the wrapped tools.
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
