//! Error types surfaced by the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tighten_engine::{EngineError, RecipeError, VerificationOutcome, VerifierError};

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Recipe(#[from] RecipeError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("verifier unavailable: {0}")]
    Verifier(#[from] VerifierError),
    #[error("verification failed: {0}")]
    VerificationFailed(VerificationOutcome),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
