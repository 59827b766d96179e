//! Process execution utilities
//!
//! Runs external tools from the project root with inherited stdio and echoes
//! each command line before it runs.

use crate::error::{Result, RunnerError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, instrument, warn};

/// Utility for running external processes
#[derive(Debug)]
pub struct ProcessRunner {
    debug: bool,
    dry_run: bool,
    current_dir: PathBuf,
}

impl ProcessRunner {
    /// Create a new process runner working in `current_dir`
    #[must_use]
    pub fn new(current_dir: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            debug,
            dry_run: false,
            current_dir: current_dir.into(),
        }
    }

    /// Echo commands instead of running them
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run a command with arguments, inheriting stdin/stdout/stderr
    #[instrument(skip(self))]
    pub fn run_command(&self, command: &str, args: &[String]) -> Result<()> {
        let cmd_str = format_command(command, args);
        self.trace(&cmd_str);

        if self.dry_run {
            return Ok(());
        }

        let status = Command::new(command)
            .args(args)
            .current_dir(&self.current_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| RunnerError::spawn(cmd_str.clone(), e))?;

        if !status.success() {
            let exit_code = status.code();
            warn!("Command exited with {exit_code:?}: {cmd_str}");
            return Err(RunnerError::process(cmd_str, exit_code));
        }

        debug!("Command completed successfully");
        Ok(())
    }

    /// Start a command without waiting for it, discarding all of its output
    #[instrument(skip(self))]
    pub fn spawn_detached(&self, command: &str, args: &[String]) -> Result<()> {
        let cmd_str = format_command(command, args);
        self.trace(&cmd_str);

        if self.dry_run {
            return Ok(());
        }

        let child = Command::new(command)
            .args(args)
            .current_dir(&self.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RunnerError::spawn(cmd_str, e))?;

        debug!("Detached process started with pid {}", child.id());
        Ok(())
    }

    /// Expand a glob pattern relative to the working directory
    ///
    /// Matches come back relative and sorted. A pattern without matches is
    /// returned unchanged, the way a POSIX shell leaves it.
    pub fn expand_glob(&self, pattern: &str) -> Vec<String> {
        let base = glob::Pattern::escape(&self.current_dir.to_string_lossy());
        let full_pattern = format!("{base}/{pattern}");

        let mut matches: Vec<String> = match glob::glob(&full_pattern) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("Error reading path while expanding {}: {}", pattern, e);
                        None
                    }
                })
                .map(|path| {
                    path.strip_prefix(&self.current_dir)
                        .map(Path::to_path_buf)
                        .unwrap_or(path)
                        .to_string_lossy()
                        .into_owned()
                })
                .collect(),
            Err(e) => {
                warn!("Invalid glob pattern {}: {}", pattern, e);
                Vec::new()
            }
        };

        if matches.is_empty() {
            debug!("No matches for {}, passing it through", pattern);
            return vec![pattern.to_string()];
        }

        matches.sort();
        matches
    }

    fn trace(&self, cmd_str: &str) {
        if self.debug {
            debug!(
                "Running command in {}: {}",
                self.current_dir.display(),
                cmd_str
            );
        }
        info!("+ {}", cmd_str);
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(".", false)
    }
}

/// Render a command line for echoing
fn format_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        return command.to_string();
    }
    format!("{} {}", command, args.join(" "))
}
