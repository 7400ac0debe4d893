//! Drives rules across files, one verified edit at a time.
//!
//! For every rule, and for every file in lexicographic order, the controller
//! scans forward from a [`ResumeCursor`], opens a [`Transaction`] for each
//! eligible line, and advances the cursor past that line whether the edit was
//! committed or rolled back. A rule runs to exhaustion on one file before the
//! next file is considered, and every file before the next rule.
//!
//! Rescanning is forward-only: an edit can never make an earlier line of the
//! same file eligible, since the rewritten line is always at or after the
//! cursor.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::locator;
use crate::mutator;
use crate::report::{RunReporter, StructuredRunReporter};
use crate::rule::EditRule;
use crate::source::{LineNumber, SourceFile};
use crate::summary::{RunSummary, TransactionRecord};
use crate::transaction::{BackupSlot, Transaction};
use crate::verifier::{VerificationPlan, Verifier};

/// First line not yet considered for the current (rule, file) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResumeCursor(LineNumber);

impl ResumeCursor {
    /// Cursor at the first line.
    #[must_use]
    pub const fn start() -> Self {
        Self(LineNumber::FIRST)
    }

    /// Line the next scan starts from.
    #[must_use]
    pub const fn position(self) -> LineNumber {
        self.0
    }

    /// Moves the cursor to the line after `line`.
    ///
    /// The result is always strictly greater than `self`, even for a line
    /// before the cursor.
    #[must_use]
    pub const fn advance_past(self, line: LineNumber) -> Self {
        if line.get() >= self.0.get() {
            Self(line.next())
        } else {
            Self(self.0.next())
        }
    }
}

enum ScanState {
    Scanning(ResumeCursor),
    Exhausted,
}

/// Orchestrates backup, mutate, verify, and commit-or-rollback.
pub struct TransactionController<'a> {
    verifier: &'a dyn Verifier,
    plan: &'a VerificationPlan,
    slot: &'a BackupSlot,
    reporter: &'a dyn RunReporter,
}

impl<'a> TransactionController<'a> {
    /// Creates a controller that reports through `tracing`.
    #[must_use]
    pub const fn new(verifier: &'a dyn Verifier, plan: &'a VerificationPlan, slot: &'a BackupSlot) -> Self {
        Self {
            verifier,
            plan,
            slot,
            reporter: &StructuredRunReporter,
        }
    }

    /// Replaces the run reporter.
    #[must_use]
    pub const fn with_reporter(mut self, reporter: &'a dyn RunReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Applies `rules` in order to `files` and returns every transaction
    /// attempted.
    ///
    /// Nothing is written unless the project verifies before the first edit.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when a rule is invalid, the plan is empty,
    /// the backup slot is occupied or collides with a file, the baseline
    /// verification does not pass, or any I/O or verifier failure occurs
    /// mid-run.
    pub fn run(&self, rules: &[EditRule], files: &[PathBuf]) -> Result<RunSummary, EngineError> {
        let ordered_files = ordered(files);
        self.check_preconditions(rules, &ordered_files)?;

        self.reporter.run_starting(rules.len(), ordered_files.len());
        let baseline = self.verifier.verify(self.plan)?;
        self.reporter.baseline_verified(&baseline);
        if !baseline.passed() {
            return Err(EngineError::InitialVerificationFailed { outcome: baseline });
        }

        let mut summary = RunSummary::new();
        for (rule_index, rule) in rules.iter().enumerate() {
            for path in &ordered_files {
                self.exhaust(rule_index, rule, path, &mut summary)?;
            }
        }

        self.reporter.run_finished(&summary);
        Ok(summary)
    }

    fn check_preconditions(&self, rules: &[EditRule], files: &[PathBuf]) -> Result<(), EngineError> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate()
                .map_err(|source| EngineError::InvalidRule { index, source })?;
        }
        if self.plan.is_empty() {
            return Err(EngineError::EmptyPlan);
        }
        self.slot.ensure_vacant()?;

        let reserved = [
            absolute(self.slot.path()),
            absolute(&self.slot.journal_path()),
        ];
        if let Some(path) = files
            .iter()
            .find(|path| reserved.contains(&absolute(path)))
        {
            return Err(EngineError::BackupCollision { path: path.clone() });
        }
        Ok(())
    }

    /// Runs one (rule, file) pair until the locator finds nothing more.
    fn exhaust(
        &self,
        rule_index: usize,
        rule: &EditRule,
        path: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), EngineError> {
        self.reporter.scan_started(rule_index, rule, path);
        let mut state = ScanState::Scanning(ResumeCursor::start());
        while let ScanState::Scanning(cursor) = state {
            state = self.attempt(rule_index, rule, path, cursor, summary)?;
        }
        self.reporter.file_exhausted(rule_index, path);
        Ok(())
    }

    /// Locates the next candidate at or after `cursor` and resolves it.
    fn attempt(
        &self,
        rule_index: usize,
        rule: &EditRule,
        path: &Path,
        cursor: ResumeCursor,
        summary: &mut RunSummary,
    ) -> Result<ScanState, EngineError> {
        let file = match SourceFile::read(path) {
            Ok(file) => file,
            Err(EngineError::NotUtf8 { .. }) => {
                self.reporter.file_skipped(rule_index, path);
                return Ok(ScanState::Exhausted);
            }
            Err(err) => return Err(err),
        };
        let Some(line) = locator::find_next(&file, rule, cursor.position()) else {
            return Ok(ScanState::Exhausted);
        };
        self.reporter.candidate_found(rule_index, path, line);

        let candidate = mutator::apply(file.content(), line, rule.search(), rule.replacement())
            .map_err(|source| EngineError::Precondition {
                path: path.to_path_buf(),
                line,
                source,
            })?;

        let transaction = Transaction::begin(self.slot, file, line, rule_index)?;
        let outcome = transaction.execute(&candidate, self.verifier, self.plan)?;
        self.reporter.transaction_resolved(path, line, &outcome);
        summary.push(TransactionRecord::new(
            rule_index,
            path.to_path_buf(),
            line,
            outcome,
        ));

        Ok(ScanState::Scanning(cursor.advance_past(line)))
    }
}

fn ordered(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut sorted = files.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
