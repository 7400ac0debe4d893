//! Enumerates candidate source files under project roots.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::EngineError;

/// Tracing target for file discovery.
const DISCOVERY_TARGET: &str = "tighten_engine::discovery";

/// Which files under the roots are candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFilter {
    extensions: Vec<String>,
    excluded_segments: Vec<String>,
}

impl DiscoveryFilter {
    /// Keeps files whose extension is listed, and drops any path with a
    /// component that contains one of `excluded_segments`.
    ///
    /// Extensions may be written with or without a leading dot.
    #[must_use]
    pub fn new<E, S>(extensions: E, excluded_segments: S) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_owned())
                .collect(),
            excluded_segments: excluded_segments
                .into_iter()
                .map(|segment| segment.as_ref().to_owned())
                .collect(),
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_segments
            .iter()
            .any(|segment| name.contains(segment.as_str()))
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

/// Walks every root and returns the candidate files in lexicographic order.
///
/// Symbolic links are never followed. A root that is itself a file is kept
/// when it passes the filter. Exclusions apply to path components below each
/// root, so a root may itself live under an excluded name.
///
/// # Errors
///
/// Returns [`EngineError::Discovery`] when a root or directory cannot be
/// read.
pub fn discover(roots: &[PathBuf], filter: &DiscoveryFilter) -> Result<Vec<PathBuf>, EngineError> {
    let mut found = BTreeSet::new();
    for root in roots {
        walk_root(root, filter, &mut found)?;
    }
    debug!(
        target: DISCOVERY_TARGET,
        roots = roots.len(),
        files = found.len(),
        "discovered candidate files"
    );
    Ok(found.into_iter().collect())
}

fn walk_root(
    root: &Path,
    filter: &DiscoveryFilter,
    found: &mut BTreeSet<PathBuf>,
) -> Result<(), EngineError> {
    let metadata =
        fs::symlink_metadata(root).map_err(|err| EngineError::discovery(root.to_path_buf(), err))?;
    if metadata.is_file() {
        if filter.has_wanted_extension(root) {
            found.insert(root.to_path_buf());
        }
        return Ok(());
    }

    let mut pending = vec![root.to_path_buf()];
    while let Some(directory) = pending.pop() {
        let entries = fs::read_dir(&directory)
            .map_err(|err| EngineError::discovery(directory.clone(), err))?;
        for item in entries {
            let entry = item.map_err(|err| EngineError::discovery(directory.clone(), err))?;
            let file_type = entry
                .file_type()
                .map_err(|err| EngineError::discovery(entry.path(), err))?;
            let name = entry.file_name();
            if filter.is_excluded(&name.to_string_lossy()) {
                continue;
            }

            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && filter.has_wanted_extension(&path) {
                found.insert(path);
            }
        }
    }
    Ok(())
}
