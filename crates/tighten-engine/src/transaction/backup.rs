//! The fixed backup slot.
//!
//! While a transaction is open the slot holds a byte-exact copy of the file
//! being edited, plus a small JSON journal naming that file and the edit.
//! Rollback restores from the in-memory snapshot; the slot exists so that a
//! crash mid-transaction leaves enough on disk to repair the tree by hand.
//! A slot that is still occupied when a run starts means the previous run
//! did not finish, and the run refuses to proceed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::write::write_file_atomic;
use crate::error::EngineError;
use crate::source::LineNumber;

/// Journal describing the edit whose original content occupies the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// File that was being edited.
    pub target: PathBuf,
    /// Line that was rewritten.
    pub line: LineNumber,
    /// Zero-based index of the rule being applied.
    pub rule: usize,
}

/// Location of the backup copy and its journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSlot {
    path: PathBuf,
}

impl BackupSlot {
    /// Uses `path` as the backup copy; the journal lives alongside it.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the byte-exact backup copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the JSON journal.
    #[must_use]
    pub fn journal_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".journal");
        PathBuf::from(name)
    }

    /// Returns true when either slot file exists.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.path.exists() || self.journal_path().exists()
    }

    /// Fails when a previous run left the slot occupied.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StaleBackup`] when the slot is occupied.
    pub fn ensure_vacant(&self) -> Result<(), EngineError> {
        if self.is_occupied() {
            return Err(EngineError::StaleBackup {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// Writes the original content, then the journal.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Backup`] when either file cannot be written.
    pub fn store(&self, entry: &JournalEntry, original: &str) -> Result<(), EngineError> {
        write_file_atomic(&self.path, original.as_bytes())
            .map_err(|err| EngineError::backup(self.path.clone(), err))?;

        let journal = serde_json::to_vec_pretty(entry)
            .map_err(|err| EngineError::backup(self.journal_path(), io::Error::other(err)))?;
        write_file_atomic(&self.journal_path(), &journal)
            .map_err(|err| EngineError::backup(self.journal_path(), err))
    }

    /// Reads the journal left in the slot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Backup`] when the journal exists but cannot be
    /// read or parsed.
    pub fn read_journal(&self) -> Result<Option<JournalEntry>, EngineError> {
        let journal_path = self.journal_path();
        let bytes = match fs::read(&journal_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(EngineError::backup(journal_path, err)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| EngineError::backup(journal_path, io::Error::other(err)))
    }

    /// Empties the slot, journal first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Backup`] when a slot file exists but cannot be
    /// removed.
    pub fn clear(&self) -> Result<(), EngineError> {
        remove_if_present(&self.journal_path())?;
        remove_if_present(&self.path)
    }
}

fn remove_if_present(path: &Path) -> Result<(), EngineError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(EngineError::backup(path.to_path_buf(), err)),
    }
}
