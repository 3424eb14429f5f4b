//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations that touch the outside world:
//! - Test discovery (directory listing + naming convention)
//! - Test execution (child process spawn + exit status capture)
//!
//! The run loop in `test_runner.rs` only talks to these traits, so it can be driven by in-memory fakes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use super::config::RunnerConfig;
use super::environment::ExecutionEnvironment;
use super::test_runner::{TestUnit, UnitOutcome};

/// Errors that abort a run before any unit executes
#[derive(Debug, Error)]
pub enum TestError {
    #[error("failed to discover tests: {0}")]
    Discovery(String),

    #[error("failed to configure the test environment: {0}")]
    Environment(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Test Discovery Interface
// ============================================================================

/// Enumerate the test units of a run.
pub trait TestDiscovery {
    /// Return every test unit in execution order. An empty list is a valid answer.
    fn discover(&self) -> Result<Vec<TestUnit>, TestError>;
}

// ============================================================================
// Test Executor Interface
// ============================================================================

/// Run one test unit to completion.
///
/// Implementations never fail: a unit that cannot be started is reported as [`UnitOutcome::NotStarted`].
pub trait TestExecutor {
    fn execute(&self, unit: &TestUnit, env: &ExecutionEnvironment) -> UnitOutcome;
}

// ============================================================================
// Default Implementations
// ============================================================================

/// Lists a single directory (non-recursive) for files matching the configured prefix and suffix.
pub struct DefaultTestDiscovery {
    root: PathBuf,
    config: RunnerConfig,
}

impl DefaultTestDiscovery {
    pub fn new(root: impl Into<PathBuf>, config: RunnerConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TestDiscovery for DefaultTestDiscovery {
    fn discover(&self) -> Result<Vec<TestUnit>, TestError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| TestError::Discovery(format!("cannot read directory '{}': {}", self.root.display(), e)))?;

        let mut units = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            if !self.config.matches(&file_name) {
                continue;
            }
            let name = file_name.to_string_lossy().into_owned();
            // Follows symlinks, so a linked test file still counts
            if !entry.path().is_file() {
                tracing::debug!(%name, "skipping non-file entry matching the test pattern");
                continue;
            }
            units.push(TestUnit::new(entry.path(), name));
        }

        // Same order a shell glob would expand to
        units.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        tracing::debug!(count = units.len(), root = %self.root.display(), "discovered test units");
        Ok(units)
    }
}

/// Hands each unit to an interpreter as a child process with inherited stdio.
pub struct DefaultTestExecutor {
    interpreter: String,
}

impl DefaultTestExecutor {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.interpreter.clone())
    }
}

impl TestExecutor for DefaultTestExecutor {
    fn execute(&self, unit: &TestUnit, env: &ExecutionEnvironment) -> UnitOutcome {
        tracing::debug!(unit = %unit.name, interpreter = %self.interpreter, "starting test unit");

        let status = Command::new(&self.interpreter)
            .arg(&unit.path)
            .envs(env.vars())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status();

        match status {
            Ok(status) => outcome_from_status(status),
            Err(e) => UnitOutcome::NotStarted {
                reason: format!("{}: {}", self.interpreter, e),
            },
        }
    }
}

/// Classify a child's termination status.
pub fn outcome_from_status(status: ExitStatus) -> UnitOutcome {
    if status.success() {
        return UnitOutcome::Passed;
    }
    match status.code() {
        Some(code) => UnitOutcome::Failed { code },
        None => UnitOutcome::Signalled {
            signal: termination_signal(&status),
        },
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    fn names(units: &[TestUnit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_discovers_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "TestGenerator.py");
        touch(dir.path(), "TestBookingApi_00.py");
        touch(dir.path(), "test_lowercase.py");
        touch(dir.path(), "TestNotes.txt");
        touch(dir.path(), "helpers.py");

        let discovery = DefaultTestDiscovery::new(dir.path(), RunnerConfig::default());
        let units = discovery.discover().unwrap();

        assert_eq!(names(&units), vec!["TestBookingApi_00.py", "TestGenerator.py"]);
    }

    #[test]
    fn test_discovery_is_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["TestC.py", "TestA.py", "TestB.py"] {
            touch(dir.path(), name);
        }

        let units = DefaultTestDiscovery::new(dir.path(), RunnerConfig::default())
            .discover()
            .unwrap();

        assert_eq!(names(&units), vec!["TestA.py", "TestB.py", "TestC.py"]);
    }

    #[test]
    fn test_discovery_is_not_recursive_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("TestPackage.py")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "TestNested.py");

        let units = DefaultTestDiscovery::new(dir.path(), RunnerConfig::default())
            .discover()
            .unwrap();

        assert!(units.is_empty());
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let units = DefaultTestDiscovery::new(dir.path(), RunnerConfig::default())
            .discover()
            .unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_missing_directory_is_a_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let err = DefaultTestDiscovery::new(&missing, RunnerConfig::default())
            .discover()
            .unwrap_err();

        assert!(matches!(err, TestError::Discovery(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_unit_path_points_into_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "TestA.py");

        let discovery = DefaultTestDiscovery::new(dir.path(), RunnerConfig::default());
        let units = discovery.discover().unwrap();

        assert_eq!(units[0].path, discovery.root().join("TestA.py"));
    }

    #[test]
    fn test_missing_interpreter_is_not_started() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "TestA.py");
        let unit = TestUnit::new(dir.path().join("TestA.py"), "TestA.py");

        let executor = DefaultTestExecutor::new("suiterun-no-such-interpreter");
        let outcome = executor.execute(&unit, &ExecutionEnvironment::empty());

        match outcome {
            UnitOutcome::NotStarted { reason } => assert!(reason.contains("suiterun-no-such-interpreter")),
            other => panic!("expected NotStarted, got {:?}", other),
        }
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn script(dir: &Path, name: &str, body: &str) -> TestUnit {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            TestUnit::new(path, name)
        }

        #[test]
        fn test_non_utf8_unit_is_discovered_and_run() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let dir = tempfile::tempdir().unwrap();
            let raw = OsStr::from_bytes(b"Test\xff.py");
            fs::write(dir.path().join(raw), "exit 1\n").unwrap();
            touch(dir.path(), "TestA.py");

            let units = DefaultTestDiscovery::new(dir.path(), RunnerConfig::default())
                .discover()
                .unwrap();

            assert_eq!(names(&units), vec!["TestA.py", "Test\u{FFFD}.py"]);
            assert_eq!(units[1].path.file_name(), Some(raw));
            let outcome = DefaultTestExecutor::new("sh").execute(&units[1], &ExecutionEnvironment::empty());
            assert_eq!(outcome, UnitOutcome::Failed { code: 1 });
        }

        #[test]
        fn test_exit_zero_passes() {
            let dir = tempfile::tempdir().unwrap();
            let unit = script(dir.path(), "TestOk.sh", "exit 0\n");
            let outcome = DefaultTestExecutor::new("sh").execute(&unit, &ExecutionEnvironment::empty());
            assert_eq!(outcome, UnitOutcome::Passed);
        }

        #[test]
        fn test_nonzero_exit_code_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let unit = script(dir.path(), "TestBad.sh", "exit 3\n");
            let outcome = DefaultTestExecutor::new("sh").execute(&unit, &ExecutionEnvironment::empty());
            assert_eq!(outcome, UnitOutcome::Failed { code: 3 });
        }

        #[test]
        fn test_signal_termination_is_failure() {
            let dir = tempfile::tempdir().unwrap();
            let unit = script(dir.path(), "TestKilled.sh", "kill -9 $$\n");
            let outcome = DefaultTestExecutor::new("sh").execute(&unit, &ExecutionEnvironment::empty());
            assert_eq!(outcome, UnitOutcome::Signalled { signal: Some(9) });
            assert!(outcome.is_failure());
        }

        #[test]
        fn test_environment_reaches_the_child() {
            let dir = tempfile::tempdir().unwrap();
            let unit = script(
                dir.path(),
                "TestEnv.sh",
                "[ \"$PYTHONPATH\" = \"/expected/src\" ] || exit 1\n",
            );
            let env = ExecutionEnvironment::empty().with_var("PYTHONPATH", "/expected/src");

            assert_eq!(DefaultTestExecutor::new("sh").execute(&unit, &env), UnitOutcome::Passed);
            assert_eq!(
                DefaultTestExecutor::new("sh").execute(&unit, &ExecutionEnvironment::empty().with_var("PYTHONPATH", "/other")),
                UnitOutcome::Failed { code: 1 }
            );
        }
    }
}
