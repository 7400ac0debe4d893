//! A single mutate-verify-commit cycle.
//!
//! A [`Transaction`] exists only between "candidate found" and "committed or
//! rolled back". It owns an in-memory snapshot of the file as it was before
//! the edit, and rollback restores from that snapshot. The on-disk
//! [`BackupSlot`] mirrors the snapshot for crash recovery only.

mod backup;
mod write;


use std::path::PathBuf;

use tracing::debug;

pub use backup::{BackupSlot, JournalEntry};
use write::write_file_atomic;

use crate::error::EngineError;
use crate::source::{LineNumber, SourceFile};
use crate::verifier::{VerificationOutcome, VerificationPlan, Verifier};

/// Tracing target for transaction operations.
const TRANSACTION_TARGET: &str = "tighten_engine::transaction";

/// How a transaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Verification passed and the edit was kept.
    Committed,
    /// Verification did not pass and the file was restored.
    RolledBack {
        /// Why verification did not pass.
        reason: VerificationOutcome,
    },
}

impl TransactionOutcome {
    /// Returns true when the edit was kept.
    #[must_use]
    pub const fn committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// An in-flight edit of one line in one file.
#[derive(Debug)]
pub struct Transaction<'s> {
    slot: &'s BackupSlot,
    path: PathBuf,
    original: String,
    line: LineNumber,
    rule_index: usize,
}

impl<'s> Transaction<'s> {
    /// Opens a transaction by snapshotting `file` and filling the backup slot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Backup`] when the slot cannot be written.
    pub fn begin(
        slot: &'s BackupSlot,
        file: SourceFile,
        line: LineNumber,
        rule_index: usize,
    ) -> Result<Self, EngineError> {
        let path = file.path().to_path_buf();
        let entry = JournalEntry {
            target: path.clone(),
            line,
            rule: rule_index,
        };
        let original = file.into_content();
        slot.store(&entry, &original)?;
        debug!(
            target: TRANSACTION_TARGET,
            path = %path.display(),
            line = line.get(),
            rule = rule_index,
            "transaction opened"
        );
        Ok(Self {
            slot,
            path,
            original,
            line,
            rule_index,
        })
    }

    /// Content before the edit.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Installs `candidate`, verifies, and commits or rolls back.
    ///
    /// A verifier that cannot run, or a candidate that cannot be written,
    /// still restores the original before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the candidate cannot be installed, the
    /// verifier cannot run, or the slot and restore steps fail.
    pub fn execute(
        self,
        candidate: &str,
        verifier: &dyn Verifier,
        plan: &VerificationPlan,
    ) -> Result<TransactionOutcome, EngineError> {
        if let Err(err) = write_file_atomic(&self.path, candidate.as_bytes()) {
            let error = EngineError::file_write(self.path.clone(), err);
            self.rollback()?;
            return Err(error);
        }

        let outcome = match verifier.verify(plan) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.rollback()?;
                return Err(err.into());
            }
        };

        if outcome.passed() {
            self.commit()?;
            Ok(TransactionOutcome::Committed)
        } else {
            self.rollback()?;
            Ok(TransactionOutcome::RolledBack { reason: outcome })
        }
    }

    /// Keeps the installed content and empties the slot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Backup`] when the slot cannot be cleared.
    pub fn commit(self) -> Result<(), EngineError> {
        self.slot.clear()?;
        debug!(
            target: TRANSACTION_TARGET,
            path = %self.path.display(),
            line = self.line.get(),
            rule = self.rule_index,
            "transaction committed"
        );
        Ok(())
    }

    /// Restores the snapshot, confirms it landed byte for byte, then empties
    /// the slot.
    ///
    /// The slot is left in place when restoration fails so the original can
    /// be recovered by hand.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Restore`] or [`EngineError::RestoreMismatch`]
    /// when the file cannot be put back, and [`EngineError::Backup`] when the
    /// slot cannot be cleared afterwards.
    pub fn rollback(self) -> Result<(), EngineError> {
        write_file_atomic(&self.path, self.original.as_bytes())
            .map_err(|err| EngineError::restore(self.path.clone(), err))?;

        let restored =
            std::fs::read(&self.path).map_err(|err| EngineError::restore(self.path.clone(), err))?;
        if restored != self.original.as_bytes() {
            return Err(EngineError::RestoreMismatch {
                path: self.path.clone(),
            });
        }

        self.slot.clear()?;
        debug!(
            target: TRANSACTION_TARGET,
            path = %self.path.display(),
            line = self.line.get(),
            rule = self.rule_index,
            "transaction rolled back"
        );
        Ok(())
    }
}
