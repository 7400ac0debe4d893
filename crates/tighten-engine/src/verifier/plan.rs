//! Ordered verification steps.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One command in a verification plan.
///
/// A step runs `program args...` in `directory`. When `features` is not empty
/// the step appends `--features a,b` so the same command can be repeated over
/// several feature combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationStep {
    directory: PathBuf,
    program: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    features: Vec<String>,
}

impl VerificationStep {
    /// Builds a step with no arguments.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            program: program.into(),
            args: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the feature list passed through `--features`.
    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Working directory of the command.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list, including any `--features` suffix.
    #[must_use]
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if !self.features.is_empty() {
            args.push(String::from("--features"));
            args.push(self.features.join(","));
        }
        args
    }

    /// Resolves a relative directory against `base`.
    #[must_use]
    pub fn resolve_against(mut self, base: &Path) -> Self {
        if self.directory.is_relative() {
            self.directory = base.join(&self.directory);
        }
        self
    }
}

impl fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.command_args() {
            write!(f, " {arg}")?;
        }
        write!(f, " (in {})", self.directory.display())
    }
}

/// Ordered, non-empty list of verification steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationPlan {
    steps: Vec<VerificationStep>,
}

impl VerificationPlan {
    /// Builds a plan from steps in execution order.
    #[must_use]
    pub fn new(steps: Vec<VerificationStep>) -> Self {
        Self { steps }
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[VerificationStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true when the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
