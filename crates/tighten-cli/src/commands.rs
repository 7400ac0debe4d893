//! Subcommand execution against a loaded recipe.

use std::io::Write;

use tighten_config::Config;
use tighten_engine::{BackupSlot, PlanVerifier, Recipe, TransactionController, Verifier, preview};
use tracing::info;

use crate::AppError;
use crate::cli::CliCommand;

/// Tracing target for CLI command dispatch.
const COMMAND_TARGET: &str = "tighten_cli::commands";

/// Inputs shared by every subcommand.
pub(crate) struct CommandContext<'a> {
    pub(crate) config: &'a Config,
    /// Replaces the process-backed verifier; `None` runs the plan for real.
    pub(crate) verifier: Option<&'a dyn Verifier>,
}

pub(crate) fn execute<W: Write>(
    command: CliCommand,
    context: &CommandContext<'_>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let recipe_path = context.config.recipe_path();
    info!(
        target: COMMAND_TARGET,
        ?command,
        recipe = %recipe_path,
        "loading recipe"
    );
    let recipe = Recipe::load(recipe_path.as_std_path())?;
    let process_verifier = PlanVerifier::with_timeout(context.config.verify_timeout());
    let verifier = context.verifier.unwrap_or(&process_verifier);

    match command {
        CliCommand::Run => run_recipe(&recipe, context.config, verifier, stdout),
        CliCommand::Preview => preview_recipe(&recipe, stdout),
        CliCommand::Verify => verify_recipe(&recipe, verifier, stdout),
        CliCommand::Files => list_files(&recipe, stdout),
    }
}

fn run_recipe<W: Write>(
    recipe: &Recipe,
    config: &Config,
    verifier: &dyn Verifier,
    stdout: &mut W,
) -> Result<(), AppError> {
    let files = recipe.discover_files()?;
    let slot = BackupSlot::new(config.backup_path().into_std_path_buf());
    let summary = TransactionController::new(verifier, recipe.plan(), &slot)
        .run(recipe.rules(), &files)?;

    for record in summary.records() {
        writeln!(stdout, "{record}")?;
    }
    writeln!(
        stdout,
        "{} committed, {} rolled back",
        summary.committed(),
        summary.rolled_back()
    )?;
    Ok(())
}

fn preview_recipe<W: Write>(recipe: &Recipe, stdout: &mut W) -> Result<(), AppError> {
    let files = recipe.discover_files()?;
    let eligible = preview(recipe.rules(), &files)?;
    for item in &eligible {
        writeln!(stdout, "{item}")?;
    }
    writeln!(stdout, "{} eligible lines", eligible.len())?;
    Ok(())
}

fn verify_recipe<W: Write>(
    recipe: &Recipe,
    verifier: &dyn Verifier,
    stdout: &mut W,
) -> Result<(), AppError> {
    let outcome = verifier.verify(recipe.plan())?;
    if !outcome.passed() {
        return Err(AppError::VerificationFailed(outcome));
    }
    writeln!(
        stdout,
        "verification passed ({} steps)",
        recipe.plan().len()
    )?;
    Ok(())
}

fn list_files<W: Write>(recipe: &Recipe, stdout: &mut W) -> Result<(), AppError> {
    for path in recipe.discover_files()? {
        writeln!(stdout, "{}", path.display())?;
    }
    Ok(())
}
