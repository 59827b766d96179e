//! Plan execution
//!
//! Runs the steps of a task in order and stops at the first one that fails.
//! Only `Finally` steps still run after a failure.

use crate::{
    config::Config,
    core::action::{Action, Arg, Invocation, Removal, Step},
    error::{Result, RunnerError},
    utils::{fs::FileSystemUtils, process::ProcessRunner},
};
use tracing::{debug, info, instrument, warn};

/// Executes task plans against a project tree
pub struct Dispatcher {
    config: Config,
    process_runner: ProcessRunner,
    fs_utils: FileSystemUtils,
}

impl Dispatcher {
    /// Create a new dispatcher with the given configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            process_runner: ProcessRunner::new(config.root.clone(), config.debug)
                .with_dry_run(config.dry_run),
            fs_utils: FileSystemUtils::new(),
            config,
        }
    }

    /// Run a task with its trailing arguments
    #[instrument(skip(self, extra))]
    pub fn dispatch(&self, action: Action, extra: &[String]) -> Result<()> {
        if !action.forwards_args() && !extra.is_empty() {
            debug!("Ignoring extra arguments for {}: {:?}", action, extra);
        }

        let steps = action.plan(&self.config, extra);
        debug!("Planned {} step(s) for {}", steps.len(), action);
        self.run_steps(&steps)
    }

    /// Run steps in order, stopping at the first failure
    ///
    /// After a failure only `Finally` steps run, and the first failure is
    /// what gets returned.
    pub fn run_steps(&self, steps: &[Step]) -> Result<()> {
        let mut failure = None;

        for (i, step) in steps.iter().enumerate() {
            if failure.is_some() && !matches!(step, Step::Finally(_)) {
                debug!("Skipping step {} of {}: {:?}", i + 1, steps.len(), step);
                continue;
            }

            debug!("Step {} of {}: {:?}", i + 1, steps.len(), step);
            match self.run_step(step) {
                Ok(()) => {}
                Err(e) if failure.is_some() => warn!("Step {} also failed: {}", i + 1, e),
                Err(e) => failure = Some(e),
            }
        }

        failure.map_or(Ok(()), Err)
    }

    fn run_step(&self, step: &Step) -> Result<()> {
        match step {
            Step::Run(invocation) | Step::Finally(invocation) => {
                let args = self.resolve_args(invocation);
                self.process_runner.run_command(&invocation.program, &args)
            }
            Step::Detach(invocation) => {
                let args = self.resolve_args(invocation);
                self.process_runner.spawn_detached(&invocation.program, &args)
            }
            Step::Remove(removal) => self.remove(removal),
        }
    }

    fn resolve_args(&self, invocation: &Invocation) -> Vec<String> {
        invocation
            .args
            .iter()
            .flat_map(|arg| match arg {
                Arg::Literal(value) => vec![value.clone()],
                Arg::Glob(pattern) => self.process_runner.expand_glob(pattern),
            })
            .collect()
    }

    fn remove(&self, removal: &Removal) -> Result<()> {
        match removal {
            Removal::Tree(path) => {
                info!("+ rm -rf {}", path.display());
                if self.config.dry_run {
                    return Ok(());
                }
                let full_path = self.config.root.join(path);
                self.fs_utils
                    .remove_path_if_exists(&full_path)
                    .map_err(|e| RunnerError::file_system("remove", full_path.clone(), e))?;
            }
            Removal::Contents(path) => {
                info!("+ rm -rf {}", path.join("*").display());
                if self.config.dry_run {
                    return Ok(());
                }
                let full_path = self.config.root.join(path);
                let removed = self
                    .fs_utils
                    .clear_dir(&full_path)
                    .map_err(|e| RunnerError::file_system("clear", full_path.clone(), e))?;
                debug!("Removed {} entries from {}", removed, full_path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_config(root: &Path) -> Config {
        Config {
            debug: true,
            root: root.to_path_buf(),
            ..Config::default()
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    /// Stand-in tool that records its arguments in `calls.log`
    ///
    /// Returned as an `sh <script>` command so the script is never exec'd
    /// directly while another test thread may still hold it open.
    #[cfg(unix)]
    fn fake_tool(root: &Path, name: &str, body: &str) -> String {
        let path = root.join(format!("{name}.sh"));
        let script = format!(
            "echo \"{name} $*\" >> \"{}\"\n{body}\n",
            root.join("calls.log").display()
        );
        fs::write(&path, script).unwrap();
        format!("sh {}", path.display())
    }

    fn read_calls(root: &Path) -> Vec<String> {
        fs::read_to_string(root.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn populate_artifacts(root: &Path) {
        fs::create_dir_all(root.join("src/pypdfium2.egg-info")).unwrap();
        fs::write(root.join("src/pypdfium2.egg-info/PKG-INFO"), "meta").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/pypdfium2-4.0.0.tar.gz"), "sdist").unwrap();
        fs::create_dir_all(root.join("data/linux_x64")).unwrap();
        fs::write(root.join("data/linux_x64/pdfium"), "bin").unwrap();
        fs::create_dir_all(root.join("tests/output")).unwrap();
        fs::write(root.join("tests/output/page.png"), "png").unwrap();
    }

    #[test]
    fn test_clean_removes_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        populate_artifacts(root);

        let dispatcher = Dispatcher::new(create_test_config(root));
        dispatcher.dispatch(Action::Clean, &[]).unwrap();

        assert!(!root.join("src/pypdfium2.egg-info").exists());
        assert!(!root.join("dist").exists());
        assert!(root.join("data").is_dir());
        assert_eq!(fs::read_dir(root.join("data")).unwrap().count(), 0);
        assert!(root.join("tests/output").is_dir());
        assert_eq!(fs::read_dir(root.join("tests/output")).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_keeps_placeholder_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        populate_artifacts(root);
        fs::write(root.join("data/.gitkeep"), "").unwrap();
        fs::write(root.join("tests/output/.gitkeep"), "").unwrap();

        Dispatcher::new(create_test_config(root))
            .dispatch(Action::Clean, &[])
            .unwrap();

        assert!(root.join("data/.gitkeep").exists());
        assert!(root.join("tests/output/.gitkeep").exists());
        assert!(!root.join("data/linux_x64").exists());
        assert!(!root.join("tests/output/page.png").exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        populate_artifacts(root);

        let dispatcher = Dispatcher::new(create_test_config(root));
        dispatcher.dispatch(Action::Clean, &[]).unwrap();
        dispatcher.dispatch(Action::Clean, &[]).unwrap();
    }

    #[test]
    fn test_dry_run_leaves_tree_alone() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        populate_artifacts(root);

        let mut config = create_test_config(root);
        config.dry_run = true;
        config.tools.autoflake = "nonexistent_command_12345".to_string();

        Dispatcher::new(config)
            .dispatch(Action::Packaging, &[])
            .unwrap();

        assert!(root.join("dist/pypdfium2-4.0.0.tar.gz").exists());
        assert!(root.join("data/linux_x64/pdfium").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_forwarded_args_reach_tool() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut config = create_test_config(root);
        config.tools.python = fake_tool(root, "python", "exit 0");

        let dispatcher = Dispatcher::new(config);
        dispatcher
            .dispatch(Action::Test, &strings(&["-k", "page", "--maxfail=1"]))
            .unwrap();
        dispatcher
            .dispatch(Action::Coverage, &strings(&["-x"]))
            .unwrap();

        let calls = read_calls(root);
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            "python -m pytest tests/ tests_old/ -k page --maxfail=1"
        );
        assert!(calls[1].starts_with("python -m coverage run --omit "));
        assert!(calls[1].ends_with("-m pytest tests/ tests_old/ -x"));
        assert_eq!(calls[2], "python -m coverage report");
    }

    #[cfg(unix)]
    #[test]
    fn test_coverage_report_runs_after_failed_tests() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut config = create_test_config(root);
        config.tools.python = fake_tool(
            root,
            "python",
            "case \"$*\" in *report*) exit 0 ;; *) exit 3 ;; esac",
        );

        let err = Dispatcher::new(config)
            .dispatch(Action::Coverage, &[])
            .unwrap_err();

        assert_eq!(err.exit_code(), 3);
        let calls = read_calls(root);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], "python -m coverage report");
    }

    #[cfg(unix)]
    #[test]
    fn test_packaging_stops_when_check_fails() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        populate_artifacts(root);

        let mut config = create_test_config(root);
        config.tools.autoflake = fake_tool(root, "autoflake", "exit 0");
        config.tools.codespell = fake_tool(root, "codespell", "exit 4");
        config.tools.reuse = fake_tool(root, "reuse", "exit 0");
        config.tools.python = fake_tool(root, "python", "exit 0");
        config.tools.twine = fake_tool(root, "twine", "exit 0");
        config.tools.check_wheel_contents = fake_tool(root, "check-wheel-contents", "exit 0");

        let err = Dispatcher::new(config)
            .dispatch(Action::Packaging, &[])
            .unwrap_err();

        assert_eq!(err.exit_code(), 4);
        assert!(!root.join("dist").exists());

        let programs: Vec<String> = read_calls(root)
            .iter()
            .filter_map(|line| line.split_whitespace().next().map(str::to_string))
            .collect();
        assert_eq!(programs, strings(&["autoflake", "codespell"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_packaging_runs_full_sequence() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut config = create_test_config(root);
        config.tools.autoflake = fake_tool(root, "autoflake", "exit 0");
        config.tools.codespell = fake_tool(root, "codespell", "exit 0");
        config.tools.reuse = fake_tool(root, "reuse", "exit 0");
        config.tools.twine = fake_tool(root, "twine", "exit 0");
        config.tools.check_wheel_contents = fake_tool(root, "check-wheel-contents", "exit 0");

        // The crafting step leaves a wheel behind for the verification steps.
        config.tools.python = fake_tool(root, "python", "mkdir -p dist && touch dist/pkg-1.whl");

        Dispatcher::new(config)
            .dispatch(Action::Packaging, &[])
            .unwrap();

        let calls = read_calls(root);
        assert_eq!(
            calls,
            strings(&[
                "autoflake src/ setupsrc/ tests/ setup.py docs/source/conf.py --recursive \
                 --remove-all-unused-imports --ignore-init-module-imports --in-place",
                calls[1].as_str(),
                "reuse lint",
                "python setupsrc/pypdfium2_setup/update_pdfium.py",
                "python setupsrc/pypdfium2_setup/craft_packages.py",
                "twine check dist/pkg-1.whl",
                "check-wheel-contents dist/pkg-1.whl --ignore W002",
            ])
        );
        assert!(calls[1].starts_with("codespell --skip="));
    }

    #[test]
    fn test_missing_program_reports_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(temp_dir.path());
        config.tools.python = "nonexistent_command_12345".to_string();

        let err = Dispatcher::new(config)
            .dispatch(Action::Build, &[])
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
