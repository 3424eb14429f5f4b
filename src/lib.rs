#![forbid(unsafe_code)]
//! suiterun: a sequential test-suite runner
//!
//! Discovers `Test*.py` programs in the working directory, runs each one as a
//! child process with the library under test on `PYTHONPATH`, and reduces the
//! exit statuses to a single verdict line and process exit code.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod version;

pub use cli::config::RunnerConfig;
pub use cli::environment::ExecutionEnvironment;
pub use cli::test_interfaces::{DefaultTestDiscovery, DefaultTestExecutor, TestDiscovery, TestError, TestExecutor};
pub use cli::test_runner::{ConsoleReporter, RunResult, TestReporter, TestUnit, UnitOutcome, run_suite};
