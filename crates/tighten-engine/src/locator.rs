//! Finds the next eligible line for a rule.

use crate::rule::EditRule;
use crate::source::{LineNumber, SourceFile};

/// Returns the first line at or after `start` that is eligible under `rule`.
///
/// Returns `None` when the scan reaches the end of the file, including when
/// `start` is already past the last line.
#[must_use]
pub fn find_next(file: &SourceFile, rule: &EditRule, start: LineNumber) -> Option<LineNumber> {
    file.lines()
        .skip(start.index())
        .find(|(_, text)| rule.is_eligible(text))
        .map(|(number, _)| number)
}

/// Collects every eligible line in the file, in order.
#[must_use]
pub fn find_all(file: &SourceFile, rule: &EditRule) -> Vec<LineNumber> {
    let mut found = Vec::new();
    let mut cursor = LineNumber::FIRST;
    while let Some(line) = find_next(file, rule, cursor) {
        found.push(line);
        cursor = line.next();
    }
    found
}
