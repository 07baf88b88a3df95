//! Cached snapshots of remote profiles.
//!
//! Stored next to the source as `<profile>.history`. Written after every
//! successful fetch, read only when a fetch fails, never deleted here.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Local};

use hostmerge_core::snapshot_path;

use crate::error::SnapshotError;

/// Overwrite the snapshot for `profile` with `body`.
pub fn save(profile: &Path, body: &[u8]) -> Result<(), SnapshotError> {
    let path = snapshot_path(profile);
    std::fs::write(&path, body).map_err(|source| SnapshotError { path, source })
}

/// Load the snapshot for `profile`, or `None` if it is missing or unreadable.
pub fn load(profile: &Path) -> Option<String> {
    let path = snapshot_path(profile);
    match std::fs::read(&path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            tracing::warn!("cannot read snapshot {}: {err}", path.display());
            None
        }
    }
}

/// Modification time of the snapshot, if one exists.
pub fn modified_at(profile: &Path) -> Option<DateTime<Local>> {
    let meta = std::fs::metadata(snapshot_path(profile)).ok()?;
    meta.modified().ok().map(DateTime::<Local>::from)
}
