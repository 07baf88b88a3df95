use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the daemon runtime and its trigger tasks.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("configuration error: {0}")]
    Config(#[from] hostmerge_core::ConfigError),

    #[error("sync error: {0}")]
    Sync(#[from] hostmerge_sync::SyncError),

    #[error("{task} task failed: {reason}")]
    Task { task: &'static str, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
