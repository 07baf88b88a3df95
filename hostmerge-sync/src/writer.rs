//! Host writer.
//!
//! Rewrites the destination in place (truncate + write). The file must
//! already exist. A crash mid-write can leave it truncated until the next
//! cycle rewrites it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SyncError;

/// Outcome of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WriteResult {
    /// The destination now holds exactly `bytes` bytes of new content.
    Written { path: PathBuf, bytes: usize },
    /// `--dry-run` mode: the destination *would* have been rewritten.
    WouldWrite { path: PathBuf, bytes: usize },
}

/// Replace the content of `path` with `text`.
///
/// On error the previous on-disk content is left as it was, unless the
/// failure happened after truncation.
pub fn commit(path: &Path, text: &str, dry_run: bool) -> Result<WriteResult, SyncError> {
    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
            bytes: text.len(),
        });
    }

    let destination = |source| SyncError::Destination {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(destination)?;
    file.write_all(text.as_bytes()).map_err(destination)?;
    file.flush().map_err(destination)?;

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
        bytes: text.len(),
    })
}
