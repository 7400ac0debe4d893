//! In-process tests for the CLI runtime.

mod support;

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use rstest::{fixture, rstest};
use tighten_config::{Config, DEFAULT_BACKUP_FILE};
use tighten_engine::ConfigurableVerifier;

use self::support::{Workspace, build_args, invoke};
use crate::{AppError, ConfigLoader, run_with_loader};

const SOURCE: &str = "pub fn foo() {\npub fn main() {\npub fn bar() {\n";

#[fixture]
fn workspace() -> Workspace {
    let workspace = Workspace::new();
    workspace.write("src/lib.rs", SOURCE);
    workspace
}

#[rstest]
fn help_is_written_to_stdout(workspace: Workspace) {
    let result = invoke(workspace.config(), &ConfigurableVerifier::passing(), "--help");

    assert_eq!(result.exit, ExitCode::SUCCESS);
    assert!(result.stdout.contains("preview"), "help: {}", result.stdout);
    assert!(result.stdout.contains("--recipe-path"));
    assert!(result.stderr.is_empty());
}

#[rstest]
fn unknown_subcommand_is_a_usage_error(workspace: Workspace) {
    let result = invoke(workspace.config(), &ConfigurableVerifier::passing(), "shrink");

    assert_eq!(result.exit, ExitCode::FAILURE);
    assert!(result.stderr.contains("shrink"), "stderr: {}", result.stderr);
}

#[test]
fn configuration_errors_are_reported() {
    struct FailingLoader;

    impl ConfigLoader for FailingLoader {
        fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
            Err(AppError::Output(std::io::Error::other("config unavailable")))
        }
    }

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with_loader(build_args("run"), &mut stdout, &mut stderr, &FailingLoader);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    let message = String::from_utf8(stderr).expect("stderr utf8");
    assert!(message.contains("config unavailable"), "stderr: {message}");
}

#[rstest]
fn run_leaves_the_backup_slot_empty(workspace: Workspace) {
    let verifier = ConfigurableVerifier::passing();

    let result = invoke(workspace.config(), &verifier, "run");

    assert_eq!(result.exit, ExitCode::SUCCESS, "stderr: {}", result.stderr);
    assert!(!workspace.root().join(DEFAULT_BACKUP_FILE).exists());
    assert_eq!(verifier.calls(), 3);
}

#[rstest]
fn run_lists_each_transaction(workspace: Workspace) {
    let verifier = ConfigurableVerifier::passing().then_pass().then_fail();

    let result = invoke(workspace.config(), &verifier, "run");

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines.len(), 3, "stdout: {}", result.stdout);
    assert!(lines.first().is_some_and(|line| line.starts_with("rolled back")));
    assert!(lines.get(1).is_some_and(|line| line.starts_with("committed")));
    assert_eq!(lines.get(2), Some(&"1 committed, 1 rolled back"));
}

#[rstest]
fn stale_backup_blocks_the_run(workspace: Workspace) {
    workspace.write(DEFAULT_BACKUP_FILE, SOURCE);
    let verifier = ConfigurableVerifier::passing();

    let result = invoke(workspace.config(), &verifier, "run");

    assert_eq!(result.exit, ExitCode::FAILURE);
    assert!(result.stderr.contains("is occupied"), "stderr: {}", result.stderr);
    assert_eq!(verifier.calls(), 0);
}

#[rstest]
fn files_skips_excluded_segments(workspace: Workspace) {
    workspace.write("src/history/old.rs", "pub fn old() {}\n");
    workspace.write("src/notes.md", "pub fn in prose\n");

    let result = invoke(workspace.config(), &ConfigurableVerifier::passing(), "files");

    assert_eq!(result.exit, ExitCode::SUCCESS, "stderr: {}", result.stderr);
    let listed: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(listed.len(), 1, "stdout: {}", result.stdout);
    assert!(listed.iter().all(|line| line.ends_with("lib.rs")));
}

#[rstest]
fn invalid_recipe_is_reported(workspace: Workspace) {
    fs::write(workspace.recipe_path(), "roots = []\n").expect("rewrite recipe");

    let result = invoke(workspace.config(), &ConfigurableVerifier::passing(), "preview");

    assert_eq!(result.exit, ExitCode::FAILURE);
    assert!(result.stderr.contains("no roots"), "stderr: {}", result.stderr);
}
