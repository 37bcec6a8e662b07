//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read file contents with standardized error handling.
///
/// Non-UTF-8 content surfaces as an `internal.io_error` just like a
/// permissions failure, since neither can be rewritten.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            Error::internal_io(
                format!("{} is not valid UTF-8", path.display()),
                Some(operation.to_string()),
            )
        } else {
            Error::internal_io(e.to_string(), Some(operation.to_string()))
        }
    })
}

/// Write content to file atomically (uniquely named temp file, then rename).
///
/// Prevents data loss if the process crashes mid-write. The rename is
/// atomic on POSIX filesystems, so readers always see either the old
/// content or the new content, never a partial write. The temp file gets a
/// random name in the target directory, so no existing file is clobbered,
/// and an existing target keeps its permissions.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => {
            return Err(Error::internal_io(
                format!("Invalid path: {}", path.display()),
                Some(operation.to_string()),
            ))
        }
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (create temp)", operation)))
    })?;

    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions()).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("{} (permissions)", operation)))
        })?;
    }

    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("{} (write temp)", operation)))
        })?;

    // On failure the temp file is dropped with the error and removed.
    tmp.persist(path).map_err(|e| {
        Error::internal_io(e.error.to_string(), Some(format!("{} (rename)", operation)))
    })?;

    Ok(())
}

/// Whether the file at `path` holds exactly `expected`.
pub fn file_matches(path: &Path, expected: &str, operation: &str) -> Result<bool> {
    let on_disk = fs::read(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))?;
    Ok(on_disk == expected.as_bytes())
}
