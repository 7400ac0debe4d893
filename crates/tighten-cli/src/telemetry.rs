//! Log output for the CLI.
//!
//! Logs go to stderr so subcommand output on stdout stays clean for scripts.
//! The subscriber is installed at most once per process; later calls keep the
//! first configuration.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tighten_config::{Config, LogFormat};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

static INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    #[error("invalid log filter `{expression}`: {message}")]
    Filter { expression: String, message: String },
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Installs the global subscriber described by `config`.
pub(crate) fn install(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install_once(config))
        .map(|_| ())
}

fn install_once(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let lines = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(true)
        .with_timer(UtcTime::rfc_3339());
    let formatted = match config.log_format() {
        LogFormat::Json => lines.json().flatten_event(true).boxed(),
        LogFormat::Compact => lines.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(formatted)
        .try_init()?;
    Ok(())
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|err| TelemetryError::Filter {
        expression: expression.to_owned(),
        message: err.to_string(),
    })
}
