//! Build-and-test verification.
//!
//! A [`Verifier`] answers one question: does the project, as it currently sits
//! on disk, still pass every step of a [`VerificationPlan`]? The production
//! implementation, [`PlanVerifier`], runs the steps in order through a
//! [`StepRunner`] and stops at the first step that does not succeed.
//!
//! Step failures and timeouts are ordinary outcomes. [`VerifierError`] is
//! reserved for the verifier being unable to run at all, such as a missing
//! program.

mod command;
mod plan;
#[cfg(any(test, feature = "test-support"))]
mod test_doubles;

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

pub use command::CommandRunner;
pub use plan::{VerificationPlan, VerificationStep};
#[cfg(any(test, feature = "test-support"))]
pub use test_doubles::ConfigurableVerifier;

/// Tracing target for verification.
const VERIFIER_TARGET: &str = "tighten_engine::verifier";

/// Result of running a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The command exited successfully.
    Succeeded,
    /// The command exited unsuccessfully.
    Failed {
        /// Exit code, absent when the process was terminated by a signal.
        code: Option<i32>,
    },
    /// The command outlived its deadline and was killed.
    TimedOut {
        /// Deadline that was exceeded.
        after: Duration,
    },
}

/// Result of running a whole plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Every step succeeded.
    Passed,
    /// A step exited unsuccessfully.
    Failed {
        /// Description of the failing step.
        step: String,
        /// Exit code of the failing step, if any.
        code: Option<i32>,
    },
    /// A step was killed after exceeding its deadline.
    TimedOut {
        /// Description of the step that timed out.
        step: String,
        /// Deadline that was exceeded.
        after: Duration,
    },
}

impl VerificationOutcome {
    /// Returns true when every step succeeded.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true when a step exceeded its deadline.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed {
                step,
                code: Some(code),
            } => write!(f, "`{step}` exited with status {code}"),
            Self::Failed { step, code: None } => write!(f, "`{step}` was terminated by a signal"),
            Self::TimedOut { step, after } => {
                write!(f, "`{step}` timed out after {}s", after.as_secs())
            }
        }
    }
}

/// Errors that prevent verification from producing an outcome.
#[derive(Debug, Clone, Error)]
pub enum VerifierError {
    /// A step's program could not be started.
    #[error("failed to start `{program}` in {directory}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Working directory of the step.
        directory: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Waiting for a step's process failed.
    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        /// Program being waited on.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The verifier backend is not available.
    #[error("verifier unavailable: {message}")]
    Unavailable {
        /// Description of why the verifier is unavailable.
        message: String,
    },
}

/// Decides whether the project currently passes its verification plan.
pub trait Verifier: Send + Sync {
    /// Runs the plan against the on-disk state of the project.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifierError`] when the plan cannot be run at all.
    fn verify(&self, plan: &VerificationPlan) -> Result<VerificationOutcome, VerifierError>;
}

/// Executes a single verification step.
pub trait StepRunner: Send + Sync {
    /// Runs the step and reports how it ended.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifierError`] when the step cannot be started or awaited.
    fn run(&self, step: &VerificationStep) -> Result<StepStatus, VerifierError>;
}

/// Runs plan steps in order and stops at the first non-success.
#[derive(Debug, Clone, Default)]
pub struct PlanVerifier<R> {
    runner: R,
}

impl<R: StepRunner> PlanVerifier<R> {
    /// Creates a verifier backed by `runner`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl PlanVerifier<CommandRunner> {
    /// Creates a verifier that runs steps as child processes.
    #[must_use]
    pub const fn with_timeout(timeout: Option<Duration>) -> Self {
        Self::new(CommandRunner::new(timeout))
    }
}

impl<R: StepRunner> Verifier for PlanVerifier<R> {
    fn verify(&self, plan: &VerificationPlan) -> Result<VerificationOutcome, VerifierError> {
        for (index, step) in plan.steps().iter().enumerate() {
            debug!(
                target: VERIFIER_TARGET,
                step = index + 1,
                total = plan.len(),
                command = %step,
                "running verification step"
            );
            match self.runner.run(step)? {
                StepStatus::Succeeded => {}
                StepStatus::Failed { code } => {
                    info!(
                        target: VERIFIER_TARGET,
                        command = %step,
                        ?code,
                        "verification step failed"
                    );
                    return Ok(VerificationOutcome::Failed {
                        step: step.to_string(),
                        code,
                    });
                }
                StepStatus::TimedOut { after } => {
                    info!(
                        target: VERIFIER_TARGET,
                        command = %step,
                        timeout_secs = after.as_secs(),
                        "verification step timed out"
                    );
                    return Ok(VerificationOutcome::TimedOut {
                        step: step.to_string(),
                        after,
                    });
                }
            }
        }
        Ok(VerificationOutcome::Passed)
    }
}
