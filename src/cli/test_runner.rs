//! Test runner implementation
//!
//! ## Run loop
//!
//! `INIT → DISCOVER → (EXECUTE_UNIT)* → FINALIZE`. Units run one at a time, in discovery order, each to completion.
//! A failing unit never stops the loop; it only flips [`RunResult::any_failed`], which stays set for the rest of the
//! run.
//!
//! ## TestReporter Trait
//!
//! Output goes through the `TestReporter` trait so the run loop never writes to the terminal directly.
//! [`ConsoleReporter`] prints one line per failing unit and a single verdict line.
//!
//! ## I/O Boundaries
//!
//! Discovery and execution are abstracted via traits in `test_interfaces.rs`; the defaults list the working
//! directory and spawn the interpreter.

use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use super::config::RunnerConfig;
use super::environment::ExecutionEnvironment;
use super::test_interfaces::{DefaultTestDiscovery, DefaultTestExecutor, TestDiscovery, TestError, TestExecutor};
use super::{CliError, CliResult, ExitCode};

/// Verdict line printed when no unit failed.
pub const SUCCESS_MARKER: &str = "ALL TESTS PASSED";

/// Verdict line printed when at least one unit failed.
pub const FAILURE_MARKER: &str = "SOME TESTS FAILED";

// ============================================================================
// Data model
// ============================================================================

/// A discovered test program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    /// Path handed to the interpreter
    pub path: PathBuf,
    /// File name, used in diagnostics
    pub name: String,
}

impl TestUnit {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// How a single unit terminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Exited normally with status 0
    Passed,
    /// Exited normally with a non-zero status
    Failed { code: i32 },
    /// Killed by a signal (`None` where the platform cannot tell which)
    Signalled { signal: Option<i32> },
    /// The process could not be spawned at all
    NotStarted { reason: String },
}

impl UnitOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, UnitOutcome::Passed)
    }
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitOutcome::Passed => write!(f, "passed"),
            UnitOutcome::Failed { code } => write!(f, "exit status {}", code),
            UnitOutcome::Signalled { signal: Some(signal) } => write!(f, "terminated by signal {}", signal),
            UnitOutcome::Signalled { signal: None } => write!(f, "terminated abnormally"),
            UnitOutcome::NotStarted { reason } => write!(f, "could not start: {}", reason),
        }
    }
}

/// Accumulated outcome of a run
///
/// `any_failed` only ever moves from `false` to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    any_failed: bool,
    executed: usize,
    failed_units: Vec<String>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one unit's outcome into the run.
    pub fn record(&mut self, unit: &TestUnit, outcome: &UnitOutcome) {
        self.executed += 1;
        if outcome.is_failure() {
            self.any_failed = true;
            self.failed_units.push(unit.name.clone());
        }
    }

    pub fn any_failed(&self) -> bool {
        self.any_failed
    }

    /// Number of units that were run, passed or not
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Failing unit names in execution order
    pub fn failed_units(&self) -> &[String] {
        &self.failed_units
    }

    pub fn verdict(&self) -> &'static str {
        if self.any_failed { FAILURE_MARKER } else { SUCCESS_MARKER }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.any_failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting run progress.
pub trait TestReporter {
    /// Called once after discovery, before any unit runs
    fn on_collection_complete(&mut self, _unit_count: usize) {}

    /// Called when a unit is about to start
    fn on_unit_start(&mut self, _unit: &TestUnit) {}

    /// Called when a unit terminated with a failing outcome
    fn on_unit_failed(&mut self, unit: &TestUnit, outcome: &UnitOutcome);

    /// Called exactly once after every unit has run
    fn on_run_complete(&mut self, result: &RunResult);
}

/// Plain-text reporter: one `FAILED:` line per failing unit, then the verdict.
///
/// Lines are flushed immediately so they interleave correctly with the children's inherited output.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: fmt::Arguments<'_>) {
        // A closed stdout must not turn a finished run into a panic
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            tracing::warn!("failed to write runner output: {}", e);
        }
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_collection_complete(&mut self, unit_count: usize) {
        if unit_count == 0 {
            tracing::warn!("no test units matched; treating the empty suite as passing");
        } else {
            tracing::info!("collected {} test unit(s)", unit_count);
        }
    }

    fn on_unit_start(&mut self, unit: &TestUnit) {
        tracing::info!(unit = %unit.name, "running");
    }

    fn on_unit_failed(&mut self, unit: &TestUnit, outcome: &UnitOutcome) {
        self.line(format_args!("FAILED: {} ({})", unit.name, outcome));
    }

    fn on_run_complete(&mut self, result: &RunResult) {
        tracing::info!(
            executed = result.executed(),
            failed = result.failed_units().len(),
            "run complete"
        );
        self.line(format_args!("{}", result.verdict()));
    }
}

// ============================================================================
// Run loop
// ============================================================================

/// Run every discovered unit and return the accumulated result.
///
/// ## Errors
///
/// Only discovery can fail; once units are known, every per-unit problem is folded into the result.
pub fn run_suite(
    discovery: &dyn TestDiscovery,
    executor: &dyn TestExecutor,
    env: &ExecutionEnvironment,
    reporter: &mut dyn TestReporter,
) -> Result<RunResult, TestError> {
    let units = discovery.discover()?;
    reporter.on_collection_complete(units.len());

    let mut result = RunResult::new();
    for unit in &units {
        reporter.on_unit_start(unit);
        let outcome = executor.execute(unit, env);
        tracing::debug!(unit = %unit.name, %outcome, "unit finished");

        if outcome.is_failure() {
            reporter.on_unit_failed(unit, &outcome);
        }
        result.record(unit, &outcome);
    }

    reporter.on_run_complete(&result);
    Ok(result)
}

/// Run the suite in the current working directory with the default configuration.
///
/// The environment is resolved before discovery, so a setup problem aborts the run before any unit starts.
pub fn run_tests() -> CliResult<ExitCode> {
    let config = RunnerConfig::from_env();
    let env = ExecutionEnvironment::from_current_exe(&config).map_err(setup_error)?;
    let cwd = env::current_dir()
        .map_err(|e| CliError::failure(format!("error: cannot determine the working directory: {}", e)))?;

    let discovery = DefaultTestDiscovery::new(cwd, config.clone());
    let executor = DefaultTestExecutor::from_config(&config);
    let mut reporter = ConsoleReporter::stdout();

    let result = run_suite(&discovery, &executor, &env, &mut reporter).map_err(setup_error)?;
    Ok(result.exit_code())
}

fn setup_error(e: TestError) -> CliError {
    CliError::failure(format!("error: {}", e))
}
