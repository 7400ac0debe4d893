use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Recipe file consulted when no path is configured.
pub const DEFAULT_RECIPE_FILE: &str = "tighten.toml";

/// File name of the backup slot written next to the recipe.
pub const DEFAULT_BACKUP_FILE: &str = ".tighten.backup";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Verification deadline in seconds; zero disables the deadline.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 0;

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::default()
}

/// Default recipe location, relative to the working directory.
#[must_use]
pub fn default_recipe_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_RECIPE_FILE)
}

/// Default verification deadline.
#[must_use]
pub const fn default_verify_timeout_secs() -> u64 {
    DEFAULT_VERIFY_TIMEOUT_SECS
}
