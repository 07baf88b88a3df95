//! Profile discovery.
//!
//! Walks the data directory recursively in file-name order, so the assembled
//! hosts file is stable across runs and platforms.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use hostmerge_core::{is_supported_profile, types::display_name};

use crate::error::SyncError;

/// Return every profile file under `dir`, in walk order.
///
/// An empty result is not an error. Any traversal failure (missing directory,
/// permission denied on a subdirectory) aborts the whole collection.
pub fn collect(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| SyncError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_supported_profile(entry.path()) {
            files.push(entry.into_path());
        }
    }

    let names: Vec<String> = files.iter().map(|path| display_name(path)).collect();
    tracing::info!("data directory {}", dir.display());
    tracing::info!("profiles {names:?}");
    Ok(files)
}
