//! The task table
//!
//! Every task is described as an ordered list of [`Step`]s. Changing what a
//! task does means changing the list built here, not the code that runs it.

use crate::config::Config;
use std::fmt;
use std::path::PathBuf;

/// A named task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Test,
    Coverage,
    DocsBuild,
    DocsOpen,
    Check,
    Clean,
    Packaging,
    Build,
    Emplace,
}

/// One unit of work in a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run a program and wait for it
    Run(Invocation),
    /// Like `Run`, but also runs after an earlier step failed; the earlier
    /// failure still decides the outcome
    Finally(Invocation),
    /// Start a program in the background with its output discarded
    Detach(Invocation),
    /// Delete something under the project root
    Remove(Removal),
}

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<Arg>,
}

/// An argument, either passed as is or expanded against the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Literal(String),
    Glob(String),
}

/// What a removal step deletes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The path itself, recursively
    Tree(PathBuf),
    /// Every non-hidden entry inside the directory
    Contents(PathBuf),
}

impl Action {
    /// Name used on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Coverage => "coverage",
            Self::DocsBuild => "docs-build",
            Self::DocsOpen => "docs-open",
            Self::Check => "check",
            Self::Clean => "clean",
            Self::Packaging => "packaging",
            Self::Build => "build",
            Self::Emplace => "emplace",
        }
    }

    /// Whether trailing arguments reach the underlying tool
    pub const fn forwards_args(self) -> bool {
        !matches!(self, Self::Check | Self::Clean | Self::Packaging)
    }

    /// Expand the task into its steps
    ///
    /// `extra` is appended to the wrapped tool's arguments for forwarding
    /// tasks and dropped for the others.
    pub fn plan(self, config: &Config, extra: &[String]) -> Vec<Step> {
        let extra = if self.forwards_args() { extra } else { &[] };
        let python = config.tools.python.as_str();

        match self {
            Self::Test => vec![Step::run(
                python,
                ["-m", "pytest"]
                    .into_iter()
                    .map(Arg::literal)
                    .chain(config.layout.test_dirs.iter().map(Arg::literal))
                    .chain(extra.iter().map(Arg::literal)),
            )],
            Self::Coverage => vec![
                Step::run(
                    python,
                    ["-m", "coverage", "run", "--omit"]
                        .into_iter()
                        .map(Arg::literal)
                        .chain([Arg::literal(config.layout.coverage_omit.join(","))])
                        .chain(["-m", "pytest"].into_iter().map(Arg::literal))
                        .chain(config.layout.test_dirs.iter().map(Arg::literal))
                        .chain(extra.iter().map(Arg::literal)),
                ),
                Step::Finally(Invocation::new(
                    python,
                    ["-m", "coverage", "report"].into_iter().map(Arg::literal),
                )),
            ],
            Self::DocsBuild => vec![Step::run(
                python,
                ["-m", "sphinx", "-b", "html"]
                    .into_iter()
                    .map(Arg::literal)
                    .chain([
                        Arg::path(&config.layout.docs_source),
                        Arg::path(&config.layout.docs_build),
                    ])
                    .chain(extra.iter().map(Arg::literal)),
            )],
            Self::DocsOpen => vec![Step::Detach(Invocation::new(
                &config.tools.opener,
                [Arg::literal(config.docs_index())]
                    .into_iter()
                    .chain(extra.iter().map(Arg::literal)),
            ))],
            Self::Check => Self::check_steps(config),
            Self::Clean => vec![
                Step::Remove(Removal::Tree(config.layout.egg_info.clone())),
                Step::Remove(Removal::Tree(config.layout.dist_dir.clone())),
                Step::Remove(Removal::Contents(config.layout.data_dir.clone())),
                Step::Remove(Removal::Contents(config.layout.test_output_dir.clone())),
            ],
            Self::Packaging => Self::packaging_steps(config),
            Self::Build => vec![Self::script_step(config, "build_pdfium.py", extra)],
            Self::Emplace => vec![Self::script_step(config, "emplace.py", extra)],
        }
    }

    fn check_steps(config: &Config) -> Vec<Step> {
        let check = &config.check;
        let tools = &config.tools;

        vec![
            Step::run(
                &tools.autoflake,
                check
                    .autoflake_paths
                    .iter()
                    .chain(&check.autoflake_flags)
                    .map(Arg::literal),
            ),
            Step::run(
                &tools.codespell,
                [
                    Arg::literal(format!("--skip={}", check.codespell_skip.join(","))),
                    Arg::literal("-L"),
                    Arg::literal(check.codespell_whitelist.join(",")),
                ],
            ),
            Step::run(&tools.reuse, [Arg::literal("lint")]),
        ]
    }

    fn packaging_steps(config: &Config) -> Vec<Step> {
        let dist = config.layout.dist_dir.to_string_lossy();
        let tools = &config.tools;

        let mut steps = Self::Clean.plan(config, &[]);
        steps.extend(Self::Check.plan(config, &[]));
        steps.extend([
            Self::script_step(config, "update_pdfium.py", &[]),
            Self::script_step(config, "craft_packages.py", &[]),
            Step::run(
                &tools.twine,
                [Arg::literal("check"), Arg::Glob(format!("{dist}/*"))],
            ),
            Step::run(
                &tools.check_wheel_contents,
                [Arg::Glob(format!("{dist}/*.whl"))]
                    .into_iter()
                    .chain(
                        config
                            .check
                            .wheel_ignore
                            .iter()
                            .flat_map(|code| [Arg::literal("--ignore"), Arg::literal(code)]),
                    ),
            ),
        ]);
        steps
    }

    fn script_step(config: &Config, script: &str, extra: &[String]) -> Step {
        Step::run(
            &config.tools.python,
            [Arg::literal(config.setup_script(script))]
                .into_iter()
                .chain(extra.iter().map(Arg::literal)),
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Step {
    fn run(program: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        Self::Run(Invocation::new(program, args))
    }
}

impl Invocation {
    /// Build an invocation from a tool command and its arguments
    ///
    /// The tool command may carry leading words of its own (`uv run python`);
    /// the first word is the program, the rest precede `args`.
    pub fn new(command: &str, args: impl IntoIterator<Item = Arg>) -> Self {
        let mut words = command.split_whitespace();
        let program = words.next().unwrap_or_default().to_string();
        Self {
            program,
            args: words.map(Arg::literal).chain(args).collect(),
        }
    }
}

impl Arg {
    fn literal(value: impl AsRef<str>) -> Self {
        Self::Literal(value.as_ref().to_string())
    }

    fn path(value: &std::path::Path) -> Self {
        Self::Literal(value.to_string_lossy().into_owned())
    }
}
