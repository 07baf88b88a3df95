//! Error types for hostmerge-sync.
//!
//! [`SyncError`] aborts a whole cycle. [`SourceError`] and [`SnapshotError`]
//! stay local to one profile: the first is rendered into the hosts file as a
//! comment, the second is only logged.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that end an update cycle without touching the destination.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The data directory (or an entry beneath it) could not be traversed.
    #[error("cannot read data directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The destination hosts file could not be opened or written.
    #[error("cannot write hosts file {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the current destination content (diff only).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single profile could not be resolved to fresh content.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported file type '{extension}'")]
    Unsupported { extension: String },

    #[error("failed to read local profile: {0}")]
    ReadLocal(#[source] std::io::Error),

    #[error("failed to read remote profile: {0}")]
    ReadRemote(#[source] std::io::Error),

    #[error("remote profile has no URL on its first line")]
    MissingUrl,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("status code: {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },
}

/// Best-effort snapshot persistence failure.
#[derive(Debug, Error)]
#[error("cannot write snapshot {path}: {source}")]
pub struct SnapshotError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
