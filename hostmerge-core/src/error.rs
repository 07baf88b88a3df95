//! Error types for hostmerge-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving or preparing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `dirs::home_dir()` returned `None`, so the default data directory is unknown.
    #[error("cannot determine home directory; set $HOME or pass --data-dir")]
    HomeNotFound,

    /// The data directory could not be created or inspected.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An update interval string that does not parse as a duration.
    #[error("invalid interval '{input}': {reason}")]
    InvalidInterval { input: String, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
