//! Scriptable verifier for unit and behaviour tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{VerificationOutcome, VerificationPlan, Verifier, VerifierError};

/// Verifier whose answers are scripted in advance.
///
/// Scripted outcomes are returned in order; once the script runs out the
/// default answer is returned on every further call.
#[derive(Debug, Default)]
pub struct ConfigurableVerifier {
    script: Mutex<VecDeque<VerificationOutcome>>,
    fallback: Option<VerificationOutcome>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl ConfigurableVerifier {
    /// Creates a verifier that passes unless scripted otherwise.
    #[must_use]
    pub fn passing() -> Self {
        Self {
            fallback: Some(VerificationOutcome::Passed),
            ..Self::default()
        }
    }

    /// Creates a verifier that fails unless scripted otherwise.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fallback: Some(Self::failure()),
            ..Self::default()
        }
    }

    /// Creates a verifier that cannot run.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queues a passing answer.
    #[must_use]
    pub fn then_pass(self) -> Self {
        self.then(VerificationOutcome::Passed)
    }

    /// Queues a failing answer.
    #[must_use]
    pub fn then_fail(self) -> Self {
        self.then(Self::failure())
    }

    /// Queues a timeout.
    #[must_use]
    pub fn then_time_out(self) -> Self {
        self.then(VerificationOutcome::TimedOut {
            step: String::from("scripted"),
            after: Duration::from_secs(1),
        })
    }

    /// Queues an arbitrary answer.
    #[must_use]
    pub fn then(self, outcome: VerificationOutcome) -> Self {
        self.lock_script().push_back(outcome);
        self
    }

    /// Number of times [`Verifier::verify`] has been called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn failure() -> VerificationOutcome {
        VerificationOutcome::Failed {
            step: String::from("scripted"),
            code: Some(1),
        }
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<VerificationOutcome>> {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Verifier for ConfigurableVerifier {
    fn verify(&self, _plan: &VerificationPlan) -> Result<VerificationOutcome, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.error {
            return Err(VerifierError::Unavailable {
                message: message.clone(),
            });
        }
        if let Some(outcome) = self.lock_script().pop_front() {
            return Ok(outcome);
        }
        match &self.fallback {
            Some(outcome) => Ok(outcome.clone()),
            None => Err(VerifierError::Unavailable {
                message: String::from("verification script exhausted"),
            }),
        }
    }
}
