//! Runtime configuration: defaults, `settings.conf`, then environment overrides.
//!
//! The configuration is built once at startup and handed to the engine by
//! reference; nothing here is global.

mod parse;
mod paths;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use parse::{ENV_KEYS, apply_env, apply_file, apply_setting};
pub use paths::settings_candidates;

/// Lowest accepted check timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 10;
/// Highest accepted number of concurrent policy queries.
pub const MAX_POLICY_CONCURRENCY: usize = 16;

/// Failure while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// An explicitly requested settings file could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A value did not parse for its key.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Normalised key.
        key: String,
        /// Raw value.
        value: String,
    },
    /// The key is not a known setting.
    #[error("unknown setting {key}")]
    UnknownKey {
        /// Normalised key.
        key: String,
    },
}

/// Settings consumed by the engine and the binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Enables debug-level logging.
    pub debug_logging: bool,
    /// Count above which single-category results are flagged.
    pub warning_threshold: u32,
    /// Deadline for one whole check, in seconds.
    pub timeout_secs: u64,
    /// Maximum policy queries in flight.
    pub policy_concurrency: usize,
    /// APT index directory scanned for the last refresh time.
    pub lists_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            warning_threshold: 10,
            timeout_secs: 60,
            policy_concurrency: 1,
            lists_dir: PathBuf::from("/var/lib/apt/lists"),
        }
    }
}

impl RuntimeConfig {
    /// What: Load the configuration from every source.
    ///
    /// Inputs:
    /// - `explicit`: Settings file given on the command line, if any.
    ///
    /// Output:
    /// - The merged configuration.
    ///
    /// # Errors
    /// - Returns `Err(SettingsError::Read)` when `explicit` cannot be read. A
    ///   missing default settings file is not an error.
    ///
    /// Details:
    /// - Precedence, lowest first: defaults, settings file, `APTPULSE_*` variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut config = Self::default();
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(paths::resolve_settings_config_path);
        if let Some(path) = path {
            let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Read {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "loading settings file");
            apply_file(&mut config, &content);
        }
        apply_env(&mut config, |var| std::env::var(var).ok());
        Ok(config)
    }

    /// Check deadline as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
