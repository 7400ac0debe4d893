//! Single-line textual rewrite.
//!
//! [`apply`] is pure: it never touches the filesystem. The result differs from
//! the input in exactly one line, and every other byte (including line
//! terminators) is preserved.

use thiserror::Error;

use crate::source::{LineNumber, raw_lines, split_terminator};

/// Violations of the mutator's preconditions.
///
/// The locator guarantees these never occur for a line it reported, so the
/// controller treats any of them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The search text was empty.
    #[error("search text must not be empty")]
    EmptySearch,
    /// The requested line does not exist.
    #[error("line {line} is beyond the end of the file ({line_count} lines)")]
    LineOutOfRange {
        /// Requested line.
        line: LineNumber,
        /// Number of lines actually present.
        line_count: usize,
    },
    /// The requested line does not contain the search text.
    #[error("line {line} does not contain `{search}`")]
    SubstringMissing {
        /// Requested line.
        line: LineNumber,
        /// Text that was expected on the line.
        search: String,
    },
}

/// Replaces every occurrence of `search` on `line` with `replacement`.
///
/// # Errors
///
/// Returns a [`MutationError`] when `line` is out of range or does not contain
/// `search`.
pub fn apply(
    original: &str,
    line: LineNumber,
    search: &str,
    replacement: &str,
) -> Result<String, MutationError> {
    if search.is_empty() {
        return Err(MutationError::EmptySearch);
    }

    let mut result = String::with_capacity(original.len() + replacement.len());
    let mut line_count = 0usize;
    let mut rewritten = false;

    for (index, raw) in raw_lines(original).enumerate() {
        line_count += 1;
        if index != line.index() {
            result.push_str(raw);
            continue;
        }

        let (text, terminator) = split_terminator(raw);
        if !text.contains(search) {
            return Err(MutationError::SubstringMissing {
                line,
                search: search.to_owned(),
            });
        }
        result.push_str(&text.replace(search, replacement));
        result.push_str(terminator);
        rewritten = true;
    }

    if rewritten {
        Ok(result)
    } else {
        Err(MutationError::LineOutOfRange { line, line_count })
    }
}
