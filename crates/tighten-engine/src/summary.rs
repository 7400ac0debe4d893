//! Per-run results.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::source::LineNumber;
use crate::transaction::TransactionOutcome;

/// One resolved transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    rule_index: usize,
    path: PathBuf,
    line: LineNumber,
    outcome: TransactionOutcome,
}

impl TransactionRecord {
    /// Builds a record.
    #[must_use]
    pub const fn new(
        rule_index: usize,
        path: PathBuf,
        line: LineNumber,
        outcome: TransactionOutcome,
    ) -> Self {
        Self {
            rule_index,
            path,
            line,
            outcome,
        }
    }

    /// Index of the rule that was applied.
    #[must_use]
    pub const fn rule_index(&self) -> usize {
        self.rule_index
    }

    /// File that was edited.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Line that was rewritten.
    #[must_use]
    pub const fn line(&self) -> LineNumber {
        self.line
    }

    /// How the transaction ended.
    #[must_use]
    pub const fn outcome(&self) -> &TransactionOutcome {
        &self.outcome
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = format!("{}:{}", self.path.display(), self.line);
        match &self.outcome {
            TransactionOutcome::Committed => {
                write!(f, "committed   {location} (rule {})", self.rule_index)
            }
            TransactionOutcome::RolledBack { reason } => write!(
                f,
                "rolled back {location} (rule {}): {reason}",
                self.rule_index
            ),
        }
    }
}

/// Every transaction attempted during a run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    records: Vec<TransactionRecord>,
}

impl RunSummary {
    /// Creates an empty summary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    /// Records in the order they were resolved.
    #[must_use]
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Number of transactions attempted.
    #[must_use]
    pub fn transactions(&self) -> usize {
        self.records.len()
    }

    /// Number of committed edits.
    #[must_use]
    pub fn committed(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome.committed())
            .count()
    }

    /// Number of rolled-back edits.
    #[must_use]
    pub fn rolled_back(&self) -> usize {
        self.transactions() - self.committed()
    }
}
