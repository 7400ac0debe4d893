//! Shared configuration for the tighten toolchain.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then an
//! optional configuration file (`--config-path` or `TIGHTEN_CONFIG_PATH`),
//! then `TIGHTEN_*` environment variables, then command-line flags. The
//! resulting [`Config`] describes where the recipe lives, where the backup
//! slot is written, how long a verification step may run, and how logs are
//! emitted. The recipe itself (rules, roots, verification plan) is a separate
//! document owned by `tighten-engine`.

mod defaults;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BACKUP_FILE, DEFAULT_LOG_FILTER, DEFAULT_RECIPE_FILE, DEFAULT_VERIFY_TIMEOUT_SECS,
    default_log_filter, default_log_filter_string, default_log_format, default_recipe_path,
    default_verify_timeout_secs,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "TIGHTEN")]
pub struct Config {
    /// Recipe describing roots, rules, and the verification plan.
    #[serde(default = "default_recipe_path")]
    recipe_path: Utf8PathBuf,
    /// Fixed backup slot; defaults to a file next to the recipe.
    #[serde(default)]
    backup_path: Option<Utf8PathBuf>,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    log_format: LogFormat,
    /// Per-step verification deadline in seconds; zero waits indefinitely.
    #[serde(default = "default_verify_timeout_secs")]
    verify_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recipe_path: default_recipe_path(),
            backup_path: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            verify_timeout_secs: default_verify_timeout_secs(),
        }
    }
}

impl Config {
    /// Path to the recipe file as configured.
    #[must_use]
    pub fn recipe_path(&self) -> &Utf8Path {
        self.recipe_path.as_path()
    }

    /// Returns the backup slot, falling back to [`DEFAULT_BACKUP_FILE`] in the
    /// recipe's directory.
    #[must_use]
    pub fn backup_path(&self) -> Utf8PathBuf {
        if let Some(path) = &self.backup_path {
            return path.clone();
        }
        self.recipe_path
            .parent()
            .map_or_else(
                || Utf8PathBuf::from(DEFAULT_BACKUP_FILE),
                |parent| parent.join(DEFAULT_BACKUP_FILE),
            )
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Verification deadline, or `None` when steps may run indefinitely.
    #[must_use]
    pub const fn verify_timeout(&self) -> Option<Duration> {
        match self.verify_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Returns a copy with the recipe path replaced.
    #[must_use]
    pub fn with_recipe_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.recipe_path = path.into();
        self
    }

    /// Returns a copy with an explicit backup slot.
    #[must_use]
    pub fn with_backup_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.backup_path = Some(path.into());
        self
    }
}
