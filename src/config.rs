//! Configuration management for the task runner
//!
//! Holds the project layout and the external tools each task drives. The
//! defaults describe the pypdfium2 tree; the command line can move the root
//! and swap the interpreter.

use crate::{cli::Args, error::RunnerError};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Echo commands without running them
    pub dry_run: bool,
    /// Project root, used as working directory for every step
    pub root: PathBuf,
    /// External programs
    pub tools: ToolConfig,
    /// Paths inside the project
    pub layout: LayoutConfig,
    /// Lint settings
    pub check: CheckConfig,
}

/// External program names
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Interpreter for `-m` modules and setup scripts
    pub python: String,
    /// Unused-import scrubber
    pub autoflake: String,
    /// Spelling checker
    pub codespell: String,
    /// License-header linter
    pub reuse: String,
    /// Distribution metadata checker
    pub twine: String,
    /// Wheel content checker
    pub check_wheel_contents: String,
    /// Default document viewer launcher
    pub opener: String,
}

/// Project layout, relative to the root
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Test directories handed to pytest
    pub test_dirs: Vec<String>,
    /// Patterns excluded from coverage measurement
    pub coverage_omit: Vec<String>,
    /// Sphinx source directory
    pub docs_source: PathBuf,
    /// Sphinx HTML output directory
    pub docs_build: PathBuf,
    /// Directory holding the setup scripts
    pub setup_scripts: PathBuf,
    /// Package metadata directory created by setuptools
    pub egg_info: PathBuf,
    /// Distribution directory
    pub dist_dir: PathBuf,
    /// Downloaded binaries and generated bindings
    pub data_dir: PathBuf,
    /// Files written by the test suite
    pub test_output_dir: PathBuf,
}

/// Lint configuration
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Paths scanned for unused imports
    pub autoflake_paths: Vec<String>,
    /// Removal categories and mode flags for autoflake
    pub autoflake_flags: Vec<String>,
    /// Paths codespell skips
    pub codespell_skip: Vec<String>,
    /// Words codespell accepts
    pub codespell_whitelist: Vec<String>,
    /// Warning codes check-wheel-contents ignores
    pub wheel_ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            dry_run: false,
            root: PathBuf::from("."),
            tools: ToolConfig::default(),
            layout: LayoutConfig::default(),
            check: CheckConfig::default(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            autoflake: "autoflake".to_string(),
            codespell: "codespell".to_string(),
            reuse: "reuse".to_string(),
            twine: "twine".to_string(),
            check_wheel_contents: "check-wheel-contents".to_string(),
            opener: default_opener().to_string(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            test_dirs: vec!["tests/".to_string(), "tests_old/".to_string()],
            coverage_omit: vec![
                "tests/*".to_string(),
                "tests_old/*".to_string(),
                "src/pypdfium2/raw.py".to_string(),
                "setupsrc/*".to_string(),
            ],
            docs_source: PathBuf::from("docs/source"),
            docs_build: PathBuf::from("docs/build/html"),
            setup_scripts: PathBuf::from("setupsrc/pypdfium2_setup"),
            egg_info: PathBuf::from("src/pypdfium2.egg-info"),
            dist_dir: PathBuf::from("dist"),
            data_dir: PathBuf::from("data"),
            test_output_dir: PathBuf::from("tests/output"),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            autoflake_paths: vec![
                "src/".to_string(),
                "setupsrc/".to_string(),
                "tests/".to_string(),
                "setup.py".to_string(),
                "docs/source/conf.py".to_string(),
            ],
            autoflake_flags: vec![
                "--recursive".to_string(),
                "--remove-all-unused-imports".to_string(),
                "--ignore-init-module-imports".to_string(),
                "--in-place".to_string(),
            ],
            codespell_skip: vec![
                "./docs/build".to_string(),
                "./tests/resources".to_string(),
                "./tests/output".to_string(),
                "./data".to_string(),
                "./sourcebuild".to_string(),
                "./dist".to_string(),
                "./.git".to_string(),
                "__pycache__".to_string(),
                ".mypy_cache".to_string(),
                ".hypothesis".to_string(),
            ],
            codespell_whitelist: vec![
                "tabe".to_string(),
                "splitted".to_string(),
                "fith".to_string(),
                "flate".to_string(),
                "folx".to_string(),
                "ba".to_string(),
                "ist".to_string(),
            ],
            wheel_ignore: vec!["W002".to_string()],
        }
    }
}

/// Launcher that opens a file with the desktop's default application
const fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, RunnerError> {
        let python = args.python.trim();
        if python.is_empty() {
            return Err(RunnerError::config("Python interpreter must not be empty"));
        }

        let mut config = Self {
            debug: args.debug,
            dry_run: args.dry_run,
            root: args.root.clone(),
            ..Self::default()
        };
        config.tools.python = python.to_string();

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), RunnerError> {
        if !self.root.is_dir() {
            return Err(RunnerError::validation(format!(
                "Project root not found: {}",
                self.root.display()
            )));
        }

        if self.layout.test_dirs.is_empty() {
            return Err(RunnerError::validation("No test directories configured"));
        }

        Ok(())
    }

    /// Path of a setup script by file name
    pub fn setup_script(&self, name: &str) -> String {
        self.layout
            .setup_scripts
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    /// Rendered documentation entry page
    pub fn docs_index(&self) -> String {
        self.layout
            .docs_build
            .join("index.html")
            .to_string_lossy()
            .into_owned()
    }
}
