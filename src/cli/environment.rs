//! Execution environment shared by every test unit in a run
//!
//! Built once before the first unit starts. Each child receives a copy of the same variable set, so no unit can see a
//! different library path than its neighbours.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::config::RunnerConfig;
use super::test_interfaces::TestError;

/// Environment variables applied on top of the runner's own environment for each child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    vars: Vec<(OsString, OsString)>,
}

impl ExecutionEnvironment {
    /// Build the environment relative to the running executable's directory.
    ///
    /// ## Errors
    ///
    /// Returns [`TestError::Environment`] when the runner cannot locate its own executable.
    pub fn from_current_exe(config: &RunnerConfig) -> Result<Self, TestError> {
        let exe = env::current_exe()
            .map_err(|e| TestError::Environment(format!("cannot locate the runner executable: {}", e)))?;
        let runner_dir = exe.parent().ok_or_else(|| {
            TestError::Environment(format!("runner executable '{}' has no parent directory", exe.display()))
        })?;
        Ok(Self::for_runner_dir(config, runner_dir))
    }

    /// Build the environment for a runner living in `runner_dir`.
    pub fn for_runner_dir(config: &RunnerConfig, runner_dir: &Path) -> Self {
        let library_dir = resolve_library_dir(runner_dir, &config.library_dir);

        if !library_dir.is_dir() {
            tracing::warn!(
                "library directory {} does not exist; units may fail to import it",
                library_dir.display()
            );
        }
        tracing::debug!(var = %config.library_path_var, path = %library_dir.display(), "configured library path");

        Self {
            vars: vec![(OsString::from(&config.library_path_var), library_dir.into_os_string())],
        }
    }

    /// An environment that adds nothing to the inherited one.
    pub fn empty() -> Self {
        Self { vars: Vec::new() }
    }

    /// Add or replace a variable.
    pub fn with_var(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((key, value)),
        }
        self
    }

    /// Look up a configured variable.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_os_str())
    }

    /// Iterate over the configured variables in insertion order.
    pub fn vars(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

fn resolve_library_dir(runner_dir: &Path, library_dir: &Path) -> PathBuf {
    if library_dir.is_absolute() {
        library_dir.to_path_buf()
    } else {
        let joined = runner_dir.join(library_dir);
        // Canonical form reads better in logs; keep the joined path when the target is missing
        joined.canonicalize().unwrap_or(joined)
    }
}
