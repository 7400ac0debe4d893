//! Structured reporting for run lifecycle events.

use std::path::Path;

use crate::rule::EditRule;
use crate::source::LineNumber;
use crate::summary::RunSummary;
use crate::transaction::TransactionOutcome;
use crate::verifier::VerificationOutcome;

/// Tracing target for run lifecycle events.
const REPORT_TARGET: &str = "tighten_engine::run";

/// Observer trait used to surface run progress to telemetry sinks.
pub trait RunReporter: Send + Sync {
    /// Invoked once before the baseline verification.
    fn run_starting(&self, rules: usize, files: usize);

    /// Invoked after the baseline verification, whatever its outcome.
    fn baseline_verified(&self, outcome: &VerificationOutcome);

    /// Invoked before a rule is applied to a file.
    fn scan_started(&self, rule_index: usize, rule: &EditRule, path: &Path);

    /// Invoked when an eligible line is found.
    fn candidate_found(&self, rule_index: usize, path: &Path, line: LineNumber);

    /// Invoked after a transaction commits or rolls back.
    fn transaction_resolved(&self, path: &Path, line: LineNumber, outcome: &TransactionOutcome);

    /// Invoked when a file is left alone because it is not valid UTF-8.
    fn file_skipped(&self, rule_index: usize, path: &Path);

    /// Invoked when a rule has no further candidates in a file.
    fn file_exhausted(&self, rule_index: usize, path: &Path);

    /// Invoked once every rule has been applied to every file.
    fn run_finished(&self, summary: &RunSummary);
}

/// Default reporter that records run events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredRunReporter;

impl StructuredRunReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RunReporter for StructuredRunReporter {
    fn run_starting(&self, rules: usize, files: usize) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "run_starting",
            rules,
            files,
            "verifying project before any edit"
        );
    }

    fn baseline_verified(&self, outcome: &VerificationOutcome) {
        if outcome.passed() {
            tracing::info!(
                target: REPORT_TARGET,
                event = "baseline_verified",
                "project verifies cleanly"
            );
        } else {
            tracing::error!(
                target: REPORT_TARGET,
                event = "baseline_failed",
                outcome = %outcome,
                "project does not verify before any edit"
            );
        }
    }

    fn scan_started(&self, rule_index: usize, rule: &EditRule, path: &Path) {
        tracing::debug!(
            target: REPORT_TARGET,
            event = "scan_started",
            rule = rule_index,
            search = rule.search(),
            replacement = rule.replacement(),
            path = %path.display(),
            "scanning file"
        );
    }

    fn candidate_found(&self, rule_index: usize, path: &Path, line: LineNumber) {
        tracing::debug!(
            target: REPORT_TARGET,
            event = "candidate_found",
            rule = rule_index,
            path = %path.display(),
            line = line.get(),
            "candidate line found"
        );
    }

    fn transaction_resolved(&self, path: &Path, line: LineNumber, outcome: &TransactionOutcome) {
        match outcome {
            TransactionOutcome::Committed => tracing::info!(
                target: REPORT_TARGET,
                event = "committed",
                path = %path.display(),
                line = line.get(),
                "line {line} in file {} was demoted",
                path.display()
            ),
            TransactionOutcome::RolledBack { reason } if reason.timed_out() => tracing::warn!(
                target: REPORT_TARGET,
                event = "timed_out",
                path = %path.display(),
                line = line.get(),
                reason = %reason,
                "line {line} in file {} could not be demoted: verification timed out",
                path.display()
            ),
            TransactionOutcome::RolledBack { reason } => tracing::info!(
                target: REPORT_TARGET,
                event = "rolled_back",
                path = %path.display(),
                line = line.get(),
                reason = %reason,
                "line {line} in file {} could not be demoted",
                path.display()
            ),
        }
    }

    fn file_skipped(&self, rule_index: usize, path: &Path) {
        tracing::warn!(
            target: REPORT_TARGET,
            event = "file_skipped",
            rule = rule_index,
            path = %path.display(),
            "skipping {}: not valid UTF-8",
            path.display()
        );
    }

    fn file_exhausted(&self, rule_index: usize, path: &Path) {
        tracing::debug!(
            target: REPORT_TARGET,
            event = "file_exhausted",
            rule = rule_index,
            path = %path.display(),
            "no further candidates"
        );
    }

    fn run_finished(&self, summary: &RunSummary) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "run_finished",
            committed = summary.committed(),
            rolled_back = summary.rolled_back(),
            "run finished"
        );
    }
}
