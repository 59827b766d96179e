//! Error types for the task runner
//!
//! Subprocess failures are carried through unchanged so the runner can exit
//! with the same status the failing tool returned.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when a program could not be started at all
pub const EXIT_NOT_FOUND: u8 = 127;

/// Main error type for the task runner
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A subprocess ran and exited unsuccessfully
    #[error("Process error: {command} failed with exit code {exit_code:?}")]
    Process {
        command: String,
        exit_code: Option<i32>,
    },

    /// A subprocess could not be started
    #[error("Process error: could not start {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// File system operation errors
    #[error("File system error: {operation} failed on {path}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl RunnerError {
    /// Create a new process error
    pub fn process(command: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
        }
    }

    /// Create a new spawn error
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Exit status the runner should terminate with for this error
    ///
    /// A failed tool hands its own status through. Statuses outside `1..=255`
    /// (or a missing status after a signal) collapse to 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Process {
                exit_code: Some(code),
                ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            Self::Spawn { .. } => EXIT_NOT_FOUND,
            _ => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_code_passthrough() {
        assert_eq!(RunnerError::process("pytest", Some(5)).exit_code(), 5);
        assert_eq!(RunnerError::process("pytest", Some(2)).exit_code(), 2);
    }

    #[test]
    fn test_process_exit_code_out_of_range() {
        assert_eq!(RunnerError::process("sh", None).exit_code(), 1);
        assert_eq!(RunnerError::process("sh", Some(-1)).exit_code(), 1);
        assert_eq!(RunnerError::process("sh", Some(300)).exit_code(), 1);
    }

    #[test]
    fn test_spawn_exit_code() {
        let err = RunnerError::spawn(
            "missing-tool",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
    }

    #[test]
    fn test_validation_exit_code() {
        assert_eq!(RunnerError::validation("bad root").exit_code(), 1);
        assert_eq!(RunnerError::config("bad").exit_code(), 1);
    }
}
