//! Shared fixtures for controller tests.
//!
//! [`RecordingReporter`] captures run lifecycle events so tests can assert on
//! the order in which rules, files, and lines were visited.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::report::RunReporter;
use crate::rule::EditRule;
use crate::source::LineNumber;
use crate::summary::RunSummary;
use crate::transaction::{BackupSlot, TransactionOutcome};
use crate::verifier::{
    VerificationOutcome, VerificationPlan, VerificationStep, Verifier, VerifierError,
};

/// Lifecycle events tracked during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunEvent {
    Baseline { passed: bool },
    ScanStarted { rule: usize, file: String },
    CandidateFound { rule: usize, line: usize },
    Committed { line: usize },
    RolledBack { line: usize },
    Skipped { rule: usize, file: String },
    Exhausted { rule: usize, file: String },
    Finished { committed: usize, rolled_back: usize },
}

/// Records run events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<RunEvent> {
        self.events.lock().expect("reporter mutex poisoned").clone()
    }

    /// Lines at which candidates were found, in order.
    pub(crate) fn candidate_lines(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::CandidateFound { line, .. } => Some(line),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: RunEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl RunReporter for RecordingReporter {
    fn run_starting(&self, _rules: usize, _files: usize) {}

    fn baseline_verified(&self, outcome: &VerificationOutcome) {
        self.record(RunEvent::Baseline {
            passed: outcome.passed(),
        });
    }

    fn scan_started(&self, rule_index: usize, _rule: &EditRule, path: &Path) {
        self.record(RunEvent::ScanStarted {
            rule: rule_index,
            file: file_name(path),
        });
    }

    fn candidate_found(&self, rule_index: usize, _path: &Path, line: LineNumber) {
        self.record(RunEvent::CandidateFound {
            rule: rule_index,
            line: line.get(),
        });
    }

    fn transaction_resolved(&self, _path: &Path, line: LineNumber, outcome: &TransactionOutcome) {
        let event = if outcome.committed() {
            RunEvent::Committed { line: line.get() }
        } else {
            RunEvent::RolledBack { line: line.get() }
        };
        self.record(event);
    }

    fn file_skipped(&self, rule_index: usize, path: &Path) {
        self.record(RunEvent::Skipped {
            rule: rule_index,
            file: file_name(path),
        });
    }

    fn file_exhausted(&self, rule_index: usize, path: &Path) {
        self.record(RunEvent::Exhausted {
            rule: rule_index,
            file: file_name(path),
        });
    }

    fn run_finished(&self, summary: &RunSummary) {
        self.record(RunEvent::Finished {
            committed: summary.committed(),
            rolled_back: summary.rolled_back(),
        });
    }
}

/// Temporary project with a backup slot and a one-step plan.
pub(crate) struct Project {
    dir: TempDir,
    pub(crate) slot: BackupSlot,
    pub(crate) plan: VerificationPlan,
}

impl Project {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let slot = BackupSlot::new(dir.path().join(".tighten.backup"));
        let plan = VerificationPlan::new(vec![
            VerificationStep::new(dir.path(), "cargo").with_args(["check"]),
        ]);
        Self { dir, slot, plan }
    }

    pub(crate) fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write source file");
        path
    }

    pub(crate) fn write_bytes(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write source bytes");
        path
    }

    pub(crate) fn read(path: &Path) -> String {
        fs::read_to_string(path).expect("read source file")
    }
}

/// The demotion rule used throughout the scenarios.
pub(crate) fn demote_rule() -> EditRule {
    EditRule::new("pub fn", "pub(crate) fn").with_exclusions(["pub fn main()"])
}

/// Three-line file: two eligible lines around an excluded one.
pub(crate) const THREE_FUNCTIONS: &str = "pub fn foo() {\npub fn main() {\npub fn bar() {\n";

/// Verifier that passes a fixed number of times, then swaps the target file
/// for a directory and fails, so the following restore cannot succeed.
#[derive(Debug)]
pub(crate) struct DirectorySwapVerifier {
    target: PathBuf,
    passes: usize,
    calls: AtomicUsize,
}

impl DirectorySwapVerifier {
    pub(crate) fn new(target: impl Into<PathBuf>, passes: usize) -> Self {
        Self {
            target: target.into(),
            passes,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Verifier for DirectorySwapVerifier {
    fn verify(&self, _plan: &VerificationPlan) -> Result<VerificationOutcome, VerifierError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.passes {
            return Ok(VerificationOutcome::Passed);
        }
        fs::remove_file(&self.target).expect("remove target");
        fs::create_dir(&self.target).expect("replace target with a directory");
        Ok(VerificationOutcome::Failed {
            step: String::from("swap"),
            code: Some(1),
        })
    }
}
