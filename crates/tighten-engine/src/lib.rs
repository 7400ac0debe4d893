//! Verified, line-at-a-time source tightening.
//!
//! `tighten-engine` repeatedly finds a line matching a textual rule, rewrites
//! that single line, rebuilds and tests the project, and keeps the edit only
//! when verification passes. A failed edit is restored byte for byte before
//! the next candidate is considered, so the tree is never left broken outside
//! an in-flight transaction.
//!
//! # Architecture
//!
//! - [`locator`] finds the next eligible line from a [`ResumeCursor`].
//! - [`mutator`] produces the edited content; it never touches the disk.
//! - [`Verifier`] runs the [`VerificationPlan`]; [`PlanVerifier`] executes
//!   each step as a child process through a [`CommandRunner`].
//! - [`Transaction`] owns the pre-edit snapshot and commits or rolls back,
//!   mirroring the snapshot in a [`BackupSlot`] for crash recovery.
//! - [`TransactionController`] drives rules (outer) over files (inner) and
//!   reports progress through a [`RunReporter`].
//!
//! Matching is purely textual: there is no syntax awareness, and the
//! verification plan is the only judge of whether an edit is safe.
//!
//! # Example
//!
//! ```rust,no_run
//! use tighten_engine::{BackupSlot, PlanVerifier, Recipe, TransactionController};
//! use std::path::Path;
//!
//! let recipe = Recipe::load(Path::new("tighten.toml")).expect("recipe loads");
//! let files = recipe.discover_files().expect("roots are readable");
//! let verifier = PlanVerifier::with_timeout(None);
//! let slot = BackupSlot::new(".tighten.backup");
//!
//! let summary = TransactionController::new(&verifier, recipe.plan(), &slot)
//!     .run(recipe.rules(), &files)
//!     .expect("run completes");
//! println!("{} edits committed", summary.committed());
//! ```

pub mod controller;
pub mod discovery;
pub mod error;
pub mod locator;
pub mod mutator;
pub mod preview;
pub mod recipe;
pub mod report;
pub mod rule;
pub mod source;
pub mod summary;
pub mod transaction;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use self::controller::{ResumeCursor, TransactionController};
pub use self::discovery::{DiscoveryFilter, discover};
pub use self::error::EngineError;
pub use self::mutator::MutationError;
pub use self::preview::{Eligible, preview};
pub use self::recipe::{Recipe, RecipeError};
pub use self::report::{RunReporter, StructuredRunReporter};
pub use self::rule::{EditRule, RuleError};
pub use self::source::{LineNumber, SourceFile};
pub use self::summary::{RunSummary, TransactionRecord};
pub use self::transaction::{BackupSlot, JournalEntry, Transaction, TransactionOutcome};
#[cfg(any(test, feature = "test-support"))]
pub use self::verifier::ConfigurableVerifier;
pub use self::verifier::{
    CommandRunner, PlanVerifier, StepRunner, StepStatus, VerificationOutcome, VerificationPlan,
    VerificationStep, Verifier, VerifierError,
};
