//! CLI module for suiterun
//!
//! `suiterun` takes no arguments: run from a directory of `Test*.py` programs, it executes each one and prints a
//! verdict. Clap still provides `--help` and `--version`.
//!
//! ## Modules
//!
//! - `config` - Discovery pattern, interpreter and library location
//! - `environment` - The environment shared by every test unit
//! - `test_interfaces` - Discovery/execution traits and their default implementations
//! - `test_runner` - The sequential run loop and console reporting
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod environment;
pub mod test_interfaces;
pub mod test_runner;

use std::fmt;
use std::process;

use clap::Parser;

use crate::version::SUITERUN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run every Test*.py program in the current directory against ../src
#[derive(Parser, Debug)]
#[command(name = "suiterun")]
#[command(version = SUITERUN_VERSION)]
#[command(
    about = "Run every Test*.py program in the current directory against ../src",
    long_about = "Runs each Test*.py file in the current directory with python3, one at a time, with PYTHONPATH \
                  pointing at ../src relative to this executable. Prints one FAILED line per failing test and a \
                  final verdict; exits 0 only when no test failed.\n\n\
                  Environment: SUITERUN_LIB_DIR overrides the library directory, SUITERUN_PYTHON the interpreter, \
                  RUST_LOG the log filter."
)]
pub struct Cli {}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parsed command line.
fn execute(_cli: Cli) -> CliResult<ExitCode> {
    test_runner::run_tests()
}

// ============================================================================
// Tests
// ============================================================================
