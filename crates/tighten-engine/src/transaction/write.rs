//! Atomic file replacement.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replaces `path` with `content` by writing a sibling temporary file and
/// renaming it over the target.
///
/// The existing file's permissions are carried over so that a restore leaves
/// the file exactly as it was.
pub(crate) fn write_file_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content)?;
    temp_file.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(metadata) => temp_file.as_file().set_permissions(metadata.permissions())?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
