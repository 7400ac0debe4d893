//! Error types for the tightening engine.
//!
//! Verification failures are not errors: a candidate that breaks the build is
//! reported as a rolled-back [`crate::TransactionOutcome`]. This enum covers
//! conditions that stop a run outright.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::mutator::MutationError;
use crate::rule::RuleError;
use crate::source::LineNumber;
use crate::verifier::{VerificationOutcome, VerifierError};

/// Fatal engine errors.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The project did not verify before any edit was attempted.
    #[error("initial verification did not pass: {outcome}")]
    InitialVerificationFailed {
        /// Outcome of the baseline run.
        outcome: VerificationOutcome,
    },

    /// The mutator rejected a line the locator reported as eligible.
    #[error("cannot rewrite {path}:{line}: {source}")]
    Precondition {
        /// File being edited.
        path: PathBuf,
        /// Line reported by the locator.
        line: LineNumber,
        /// Violated precondition.
        #[source]
        source: MutationError,
    },

    /// The verifier itself could not run.
    #[error(transparent)]
    Verifier(#[from] VerifierError),

    /// Reading a source file failed.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A source file is not valid UTF-8 and cannot be edited line by line.
    #[error("{path} is not valid UTF-8")]
    NotUtf8 {
        /// File that was skipped.
        path: PathBuf,
    },

    /// Writing a source file failed.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Storing or clearing the backup slot failed.
    #[error("backup slot {path} is unusable: {source}")]
    Backup {
        /// Backup slot path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Restoring a file after a failed verification failed.
    #[error("failed to restore {path}: {source}; the original is kept in the backup slot")]
    Restore {
        /// File that could not be restored.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A restored file does not match the snapshot taken before the edit.
    #[error("restored {path} does not match its original content")]
    RestoreMismatch {
        /// File whose restoration could not be confirmed.
        path: PathBuf,
    },

    /// A previous run left a backup behind.
    #[error("backup slot {path} is occupied; a previous run did not finish cleanly")]
    StaleBackup {
        /// Backup slot path.
        path: PathBuf,
    },

    /// The backup slot is itself one of the files selected for editing.
    #[error("backup slot {path} is also a file selected for editing")]
    BackupCollision {
        /// Colliding path.
        path: PathBuf,
    },

    /// Walking a source root failed.
    #[error("failed to scan {path}: {source}")]
    Discovery {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A rule would not produce a single-line edit.
    #[error("rule {index} is invalid: {source}")]
    InvalidRule {
        /// Zero-based position of the rule.
        index: usize,
        /// Reason the rule was rejected.
        #[source]
        source: RuleError,
    },

    /// The verification plan has no steps.
    #[error("verification plan has no steps")]
    EmptyPlan,
}

impl EngineError {
    /// Creates a file read error.
    pub fn file_read(path: PathBuf, error: io::Error) -> Self {
        Self::FileRead {
            path,
            source: Arc::new(error),
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: PathBuf, error: io::Error) -> Self {
        Self::FileWrite {
            path,
            source: Arc::new(error),
        }
    }

    pub(crate) fn backup(path: PathBuf, error: io::Error) -> Self {
        Self::Backup {
            path,
            source: Arc::new(error),
        }
    }

    pub(crate) fn restore(path: PathBuf, error: io::Error) -> Self {
        Self::Restore {
            path,
            source: Arc::new(error),
        }
    }

    pub(crate) fn discovery(path: PathBuf, error: io::Error) -> Self {
        Self::Discovery {
            path,
            source: Arc::new(error),
        }
    }
}
