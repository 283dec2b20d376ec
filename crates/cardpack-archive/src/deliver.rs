use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Place finished archive bytes at `path`.
///
/// Writes to a dotted temp file beside the destination, then renames over
/// it, so the destination never holds a partial archive. Delivering twice
/// overwrites in full; it never re-runs the batch that produced the bytes.
pub fn deliver(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Deliver {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file_name = path.file_name().ok_or_else(|| Error::Deliver {
        path: path.to_path_buf(),
        source: io::Error::other("destination has no file name"),
    })?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp, bytes).map_err(|source| Error::Deliver {
        path: tmp.clone(),
        source,
    })?;

    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        Error::Deliver {
            path: path.to_path_buf(),
            source,
        }
    })
}
