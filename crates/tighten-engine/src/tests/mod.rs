//! Crate-level controller tests.

pub(crate) mod support;

use std::fs;

use rstest::{fixture, rstest};

use crate::controller::TransactionController;
use crate::error::EngineError;
use crate::locator;
use crate::rule::EditRule;
use crate::source::{LineNumber, SourceFile};
use crate::verifier::ConfigurableVerifier;

use self::support::{
    DirectorySwapVerifier, Project, RecordingReporter, RunEvent, THREE_FUNCTIONS, demote_rule,
};

#[fixture]
fn project() -> Project {
    Project::new()
}

#[rstest]
fn rules_run_outer_and_files_inner(project: Project) {
    let first = project.write("b.rs", "pub fn b() {}\n");
    let second = project.write("a.rs", "pub fn a() {}\n");
    let rules = [
        demote_rule(),
        EditRule::new("pub(crate) fn", "fn"),
    ];
    let verifier = ConfigurableVerifier::passing();
    let reporter = RecordingReporter::default();

    let summary = TransactionController::new(&verifier, &project.plan, &project.slot)
        .with_reporter(&reporter)
        .run(&rules, &[first.clone(), second.clone()])
        .expect("run succeeds");

    let scans: Vec<_> = reporter
        .events()
        .into_iter()
        .filter_map(|event| match event {
            RunEvent::ScanStarted { rule, file } => Some((rule, file)),
            _ => None,
        })
        .collect();
    assert_eq!(
        scans,
        vec![
            (0, String::from("a.rs")),
            (0, String::from("b.rs")),
            (1, String::from("a.rs")),
            (1, String::from("b.rs")),
        ]
    );
    assert_eq!(summary.committed(), 4);
    assert_eq!(Project::read(&first), "fn b() {}\n");
    assert_eq!(Project::read(&second), "fn a() {}\n");
}

#[rstest]
fn exhausted_rule_finds_nothing_further(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::passing();
    let rule = demote_rule();

    TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(std::slice::from_ref(&rule), &[path.clone()])
        .expect("run succeeds");

    let file = SourceFile::read(&path).expect("read");
    assert_eq!(locator::find_next(&file, &rule, LineNumber::FIRST), None);
}

#[rstest]
fn rolled_back_lines_remain_eligible_for_later_runs(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::failing().then_pass();

    let summary = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule()], &[path.clone()])
        .expect("run succeeds");

    assert_eq!(summary.rolled_back(), 2);
    assert_eq!(Project::read(&path), THREE_FUNCTIONS);
    let file = SourceFile::read(&path).expect("read");
    assert_eq!(locator::find_all(&file, &demote_rule()).len(), 2);
}

#[rstest]
fn verifier_failure_mid_run_restores_and_aborts(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::default().then_pass();

    let error = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule()], &[path.clone()])
        .expect_err("exhausted script is an error");

    assert!(matches!(error, EngineError::Verifier(_)));
    assert_eq!(Project::read(&path), THREE_FUNCTIONS);
    assert!(!project.slot.is_occupied());
}

#[rstest]
fn backup_slot_may_not_be_a_candidate(project: Project) {
    let slot_path = project.slot.path().to_path_buf();
    let verifier = ConfigurableVerifier::passing();

    let error = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule()], &[slot_path])
        .expect_err("collision is rejected");

    assert!(matches!(error, EngineError::BackupCollision { .. }));
    assert_eq!(verifier.calls(), 0);
}

#[rstest]
fn journal_path_collision_is_rejected(project: Project) {
    let journal = project.slot.journal_path();
    let verifier = ConfigurableVerifier::passing();

    let error = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule()], &[journal])
        .expect_err("collision is rejected");

    assert!(matches!(error, EngineError::BackupCollision { .. }));
}

#[rstest]
fn invalid_rules_are_rejected_before_verifying(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::passing();

    let error = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule(), EditRule::new("", "x")], &[path])
        .expect_err("invalid rule");

    assert!(matches!(error, EngineError::InvalidRule { index: 1, .. }));
    assert_eq!(verifier.calls(), 0);
}

#[rstest]
fn empty_plan_is_rejected(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::passing();
    let plan = crate::verifier::VerificationPlan::default();

    let error = TransactionController::new(&verifier, &plan, &project.slot)
        .run(&[demote_rule()], &[path])
        .expect_err("empty plan");

    assert!(matches!(error, EngineError::EmptyPlan));
}

#[rstest]
fn baseline_timeout_is_fatal(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::passing().then_time_out();

    let error = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule()], &[path.clone()])
        .expect_err("baseline timeout");

    let EngineError::InitialVerificationFailed { outcome } = &error else {
        panic!("expected initial verification failure, got {error:?}");
    };
    assert!(outcome.timed_out());
    assert_eq!(Project::read(&path), THREE_FUNCTIONS);
}

#[rstest]
fn reporter_sees_the_full_lifecycle(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::passing().then_pass().then_fail();
    let reporter = RecordingReporter::default();

    TransactionController::new(&verifier, &project.plan, &project.slot)
        .with_reporter(&reporter)
        .run(&[demote_rule()], &[path])
        .expect("run succeeds");

    assert_eq!(
        reporter.events(),
        vec![
            RunEvent::Baseline { passed: true },
            RunEvent::ScanStarted {
                rule: 0,
                file: String::from("lib.rs"),
            },
            RunEvent::CandidateFound { rule: 0, line: 1 },
            RunEvent::RolledBack { line: 1 },
            RunEvent::CandidateFound { rule: 0, line: 3 },
            RunEvent::Committed { line: 3 },
            RunEvent::Exhausted {
                rule: 0,
                file: String::from("lib.rs"),
            },
            RunEvent::Finished {
                committed: 1,
                rolled_back: 1,
            },
        ]
    );
}

#[rstest]
fn failed_restore_aborts_and_keeps_the_backup(project: Project) {
    let path = project.write("lib.rs", THREE_FUNCTIONS);
    let verifier = DirectorySwapVerifier::new(&path, 1);

    let error = TransactionController::new(&verifier, &project.plan, &project.slot)
        .run(&[demote_rule()], &[path.clone()])
        .expect_err("restore failure is fatal");

    assert!(matches!(error, EngineError::Restore { .. }), "got {error:?}");
    assert_eq!(verifier.calls(), 2, "no later candidate is attempted");
    assert!(project.slot.is_occupied());
    assert_eq!(
        fs::read(project.slot.path()).expect("read backup"),
        THREE_FUNCTIONS.as_bytes()
    );
    let journal = project
        .slot
        .read_journal()
        .expect("journal")
        .expect("journal present");
    assert_eq!(journal.line, LineNumber::FIRST);
}

#[rstest]
fn files_that_are_not_utf8_are_skipped_untouched(project: Project) {
    let latin1 = b"pub fn caf\xe9() {}\n";
    let skipped = project.write_bytes("a.rs", latin1);
    let edited = project.write("b.rs", THREE_FUNCTIONS);
    let verifier = ConfigurableVerifier::passing();
    let reporter = RecordingReporter::default();

    let summary = TransactionController::new(&verifier, &project.plan, &project.slot)
        .with_reporter(&reporter)
        .run(&[demote_rule()], &[skipped.clone(), edited.clone()])
        .expect("run succeeds");

    assert_eq!(summary.committed(), 2);
    assert_eq!(fs::read(&skipped).expect("read skipped"), latin1);
    assert_eq!(
        Project::read(&edited),
        "pub(crate) fn foo() {\npub fn main() {\npub(crate) fn bar() {\n"
    );
    assert!(reporter.events().contains(&RunEvent::Skipped {
        rule: 0,
        file: String::from("a.rs"),
    }));
}
