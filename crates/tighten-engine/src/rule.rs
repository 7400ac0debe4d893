//! Textual edit rules.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable search/replace pair with a set of exclusion substrings.
///
/// A line is eligible when it contains [`EditRule::search`] and none of the
/// exclusions. Matching is literal and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditRule {
    search: String,
    #[serde(rename = "replace")]
    replacement: String,
    #[serde(default)]
    exclusions: BTreeSet<String>,
}

/// Reasons a rule is rejected before any file is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The search text was empty.
    #[error("search text must not be empty")]
    EmptySearch,
    /// The search text spans more than one line.
    #[error("search text must not contain a line break")]
    MultilineSearch,
    /// The replacement spans more than one line.
    #[error("replacement text must not contain a line break")]
    MultilineReplacement,
    /// Replacing the search text with itself would never change a file.
    #[error("replacement is identical to the search text `{0}`")]
    IdentityReplacement(String),
}

impl EditRule {
    /// Builds a rule with no exclusions.
    #[must_use]
    pub fn new(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replacement: replacement.into(),
            exclusions: BTreeSet::new(),
        }
    }

    /// Adds exclusion substrings.
    #[must_use]
    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions
            .extend(exclusions.into_iter().map(Into::into));
        self
    }

    /// Text a line must contain.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Text substituted for every occurrence of the search text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Substrings that disqualify a line.
    pub fn exclusions(&self) -> impl Iterator<Item = &str> {
        self.exclusions.iter().map(String::as_str)
    }

    /// Returns true when `line` contains the search text and no exclusion.
    #[must_use]
    pub fn is_eligible(&self, line: &str) -> bool {
        line.contains(self.search.as_str())
            && !self
                .exclusions
                .iter()
                .any(|exclusion| line.contains(exclusion.as_str()))
    }

    /// Checks the rule can only ever rewrite a single line.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.search.is_empty() {
            return Err(RuleError::EmptySearch);
        }
        if self.search.contains(['\n', '\r']) {
            return Err(RuleError::MultilineSearch);
        }
        if self.replacement.contains(['\n', '\r']) {
            return Err(RuleError::MultilineReplacement);
        }
        if self.search == self.replacement {
            return Err(RuleError::IdentityReplacement(self.search.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for EditRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` -> `{}`", self.search, self.replacement)
    }
}
