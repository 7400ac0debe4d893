//! Source files viewed as sequences of one-based lines.
//!
//! Lines are split on `\n` and keep their terminators so that rebuilding a
//! file from its lines reproduces the original bytes exactly. A trailing
//! newline does not introduce an extra empty line, and an empty file has no
//! lines at all.

use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One-based line number within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineNumber(NonZeroUsize);

impl LineNumber {
    /// The first line of a file.
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// Builds a line number, returning `None` for zero.
    #[must_use]
    pub const fn new(value: usize) -> Option<Self> {
        match NonZeroUsize::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Builds the line number for a zero-based index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// One-based value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Zero-based index of this line.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.get() - 1
    }

    /// The line immediately after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Splits a raw line into its text and its terminator (`"\r\n"`, `"\n"`, or
/// empty for a final unterminated line).
pub(crate) fn split_terminator(raw: &str) -> (&str, &'static str) {
    if let Some(text) = raw.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = raw.strip_suffix('\n') {
        (text, "\n")
    } else {
        (raw, "")
    }
}

/// Iterates raw lines with their terminators.
pub(crate) fn raw_lines(content: &str) -> std::str::SplitInclusive<'_, char> {
    content.split_inclusive('\n')
}

/// A file path together with the content read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
}

impl SourceFile {
    /// Wraps content that is already in memory.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Reads the current on-disk content of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::FileRead`] when the file cannot be read and
    /// [`EngineError::NotUtf8`] when its bytes are not valid UTF-8.
    pub fn read(path: &Path) -> Result<Self, EngineError> {
        let bytes = fs::read(path).map_err(|err| EngineError::file_read(path.to_path_buf(), err))?;
        let content = String::from_utf8(bytes).map_err(|_| EngineError::NotUtf8 {
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(path, content))
    }

    /// Path the content was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full file content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consumes the file and returns its content.
    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        raw_lines(&self.content).count()
    }

    /// Text of a line without its terminator.
    #[must_use]
    pub fn line(&self, number: LineNumber) -> Option<&str> {
        raw_lines(&self.content)
            .nth(number.index())
            .map(|raw| split_terminator(raw).0)
    }

    /// Iterates numbered lines without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = (LineNumber, &str)> {
        raw_lines(&self.content)
            .enumerate()
            .map(|(index, raw)| (LineNumber::from_index(index), split_terminator(raw).0))
    }
}
