//! Dry-run listing of eligible lines.

use std::fmt;
use std::path::PathBuf;

use tracing::warn;

use crate::error::EngineError;
use crate::locator;
use crate::rule::EditRule;
use crate::source::{LineNumber, SourceFile};

/// Tracing target for preview listings.
const PREVIEW_TARGET: &str = "tighten_engine::preview";

/// A line that a rule would currently attempt to rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligible {
    /// Index of the rule.
    pub rule_index: usize,
    /// File containing the line.
    pub path: PathBuf,
    /// Eligible line.
    pub line: LineNumber,
    /// Line text without its terminator.
    pub text: String,
}

impl fmt::Display for Eligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [rule {}] {}",
            self.path.display(),
            self.line,
            self.rule_index,
            self.text.trim()
        )
    }
}

/// Lists every line each rule would attempt against the files as they are
/// now, without writing or verifying anything.
///
/// Each rule is evaluated against the unmodified content, so lines that only
/// become eligible after an earlier rule commits are not listed. Files that
/// are not valid UTF-8 are skipped with a warning, as a run would skip them.
///
/// # Errors
///
/// Returns [`EngineError::FileRead`] when a file cannot be read.
pub fn preview(rules: &[EditRule], files: &[PathBuf]) -> Result<Vec<Eligible>, EngineError> {
    let mut sorted = files.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut sources = Vec::with_capacity(sorted.len());
    for path in &sorted {
        match SourceFile::read(path) {
            Ok(file) => sources.push(file),
            Err(EngineError::NotUtf8 { path }) => {
                warn!(
                    target: PREVIEW_TARGET,
                    path = %path.display(),
                    "skipping file that is not valid UTF-8"
                );
            }
            Err(err) => return Err(err),
        }
    }

    let mut eligible = Vec::new();
    for (rule_index, rule) in rules.iter().enumerate() {
        for file in &sources {
            eligible.extend(eligible_in(rule_index, rule, file));
        }
    }
    Ok(eligible)
}

fn eligible_in(rule_index: usize, rule: &EditRule, file: &SourceFile) -> Vec<Eligible> {
    locator::find_all(file, rule)
        .into_iter()
        .map(|line| Eligible {
            rule_index,
            path: file.path().to_path_buf(),
            line,
            text: file.line(line).unwrap_or_default().to_owned(),
        })
        .collect()
}
