//! Runner configuration
//!
//! The discovery pattern, interpreter and library location are fixed constants. Only the interpreter and the library
//! directory can be redirected, through environment variables read by [`RunnerConfig::from_env`].

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// File name prefix a test unit must start with.
pub const UNIT_PREFIX: &str = "Test";

/// File name suffix a test unit must end with.
pub const UNIT_SUFFIX: &str = ".py";

/// Program used to launch each test unit.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Environment variable carrying the library search path.
pub const LIBRARY_PATH_VAR: &str = "PYTHONPATH";

/// Library-under-test location, relative to the directory holding the runner executable.
pub const DEFAULT_LIBRARY_DIR: &str = "../src";

/// Overrides [`DEFAULT_LIBRARY_DIR`] with an explicit path.
pub const LIBRARY_DIR_ENV: &str = "SUITERUN_LIB_DIR";

/// Overrides [`DEFAULT_INTERPRETER`].
pub const INTERPRETER_ENV: &str = "SUITERUN_PYTHON";

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Test unit file name prefix
    pub prefix: String,
    /// Test unit file name suffix
    pub suffix: String,
    /// Program each unit is handed to
    pub interpreter: String,
    /// Name of the library search path variable
    pub library_path_var: String,
    /// Library directory; relative paths resolve against the runner's own directory
    pub library_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            prefix: UNIT_PREFIX.to_string(),
            suffix: UNIT_SUFFIX.to_string(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            library_path_var: LIBRARY_PATH_VAR.to_string(),
            library_dir: PathBuf::from(DEFAULT_LIBRARY_DIR),
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings with `SUITERUN_LIB_DIR` / `SUITERUN_PYTHON` applied when set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Like [`RunnerConfig::from_env`], reading variables through `lookup`.
    ///
    /// An empty library directory or a blank interpreter falls back to the default; the interpreter is trimmed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(LIBRARY_DIR_ENV).filter(|v| !v.is_empty()) {
            config.library_dir = PathBuf::from(dir);
        }
        if let Some(interpreter) = lookup(INTERPRETER_ENV).and_then(|v| v.into_string().ok()) {
            if !interpreter.trim().is_empty() {
                config.interpreter = interpreter.trim().to_string();
            }
        }

        config
    }

    /// Set the discovery prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the discovery suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the library directory
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = dir.into();
        self
    }

    /// Whether a file name matches the discovery pattern.
    ///
    /// Compares raw bytes, so names that are not valid UTF-8 still match. A name that is only the prefix and suffix
    /// glued together still matches (`Test.py`), mirroring `Test*.py`.
    pub fn matches(&self, file_name: impl AsRef<OsStr>) -> bool {
        let name = file_name.as_ref().as_encoded_bytes();
        let prefix = self.prefix.as_bytes();
        let suffix = self.suffix.as_bytes();
        name.len() >= prefix.len() + suffix.len() && name.starts_with(prefix) && name.ends_with(suffix)
    }
}
