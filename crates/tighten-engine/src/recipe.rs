//! Recipe documents: what to edit and how to check it.
//!
//! A recipe is a TOML file naming the project roots to scan, the ordered
//! rules to apply, and the ordered verification plan:
//!
//! ```toml
//! roots = ["malachite-base", "malachite-nz"]
//! extensions = ["rs"]
//! excluded_segments = ["target", "history"]
//!
//! [[rules]]
//! search = "pub fn"
//! replace = "pub(crate) fn"
//! exclusions = ["pub fn main()"]
//!
//! [[verify]]
//! directory = "malachite-nz"
//! program = "cargo"
//! args = ["test", "--no-run"]
//! features = ["32_bit_limbs"]
//! ```
//!
//! Relative roots and step directories resolve against the directory that
//! holds the recipe.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::discovery::{DiscoveryFilter, discover};
use crate::error::EngineError;
use crate::rule::{EditRule, RuleError};
use crate::verifier::{VerificationPlan, VerificationStep};

/// Extensions scanned when a recipe does not list any.
pub const DEFAULT_EXTENSIONS: &[&str] = &["rs"];

/// Path segments skipped when a recipe does not list any.
pub const DEFAULT_EXCLUDED_SEGMENTS: &[&str] = &["target", "history"];

/// Errors raised while loading a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The recipe file could not be read.
    #[error("failed to read recipe {path}: {source}")]
    Read {
        /// Recipe path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The recipe is not valid TOML or has unexpected keys.
    #[error("failed to parse recipe {path}: {source}")]
    Parse {
        /// Recipe path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// No roots were listed.
    #[error("recipe lists no roots to scan")]
    MissingRoots,

    /// A rule would not produce a single-line edit.
    #[error("rule {index} is invalid: {source}")]
    InvalidRule {
        /// Zero-based position of the rule.
        index: usize,
        /// Reason the rule was rejected.
        #[source]
        source: RuleError,
    },

    /// No verification steps were listed.
    #[error("recipe has no [[verify]] steps")]
    EmptyPlan,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeDocument {
    roots: Vec<PathBuf>,
    #[serde(default)]
    extensions: Option<Vec<String>>,
    #[serde(default)]
    excluded_segments: Option<Vec<String>>,
    #[serde(default)]
    rules: Vec<EditRule>,
    #[serde(default)]
    verify: Vec<VerificationStep>,
}

/// A validated recipe with paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    roots: Vec<PathBuf>,
    filter: DiscoveryFilter,
    rules: Vec<EditRule>,
    plan: VerificationPlan,
}

impl Recipe {
    /// Reads and validates the recipe at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let text = fs::read_to_string(path).map_err(|err| RecipeError::Read {
            path: path.to_path_buf(),
            source: Arc::new(err),
        })?;
        let base = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::from_toml(&text, base).map_err(|err| match err {
            RecipeError::Parse { source, .. } => RecipeError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates recipe text, resolving relative paths against
    /// `base`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] when the text is malformed or fails
    /// validation.
    pub fn from_toml(text: &str, base: &Path) -> Result<Self, RecipeError> {
        let document: RecipeDocument =
            toml::from_str(text).map_err(|err| RecipeError::Parse {
                path: PathBuf::new(),
                source: Box::new(err),
            })?;

        if document.roots.is_empty() {
            return Err(RecipeError::MissingRoots);
        }
        for (index, rule) in document.rules.iter().enumerate() {
            rule.validate()
                .map_err(|source| RecipeError::InvalidRule { index, source })?;
        }
        if document.verify.is_empty() {
            return Err(RecipeError::EmptyPlan);
        }

        let filter = DiscoveryFilter::new(
            document
                .extensions
                .unwrap_or_else(|| to_strings(DEFAULT_EXTENSIONS)),
            document
                .excluded_segments
                .unwrap_or_else(|| to_strings(DEFAULT_EXCLUDED_SEGMENTS)),
        );
        let roots = document
            .roots
            .into_iter()
            .map(|root| resolve(base, root))
            .collect();
        let plan = VerificationPlan::new(
            document
                .verify
                .into_iter()
                .map(|step| step.resolve_against(base))
                .collect(),
        );

        Ok(Self {
            roots,
            filter,
            rules: document.rules,
            plan,
        })
    }

    /// Resolved project roots.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// File selection applied under the roots.
    #[must_use]
    pub const fn filter(&self) -> &DiscoveryFilter {
        &self.filter
    }

    /// Rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[EditRule] {
        &self.rules
    }

    /// Verification plan with resolved directories.
    #[must_use]
    pub const fn plan(&self) -> &VerificationPlan {
        &self.plan
    }

    /// Enumerates candidate files under the roots.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Discovery`] when a root cannot be walked.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, EngineError> {
        discover(&self.roots, &self.filter)
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
