//! hostmerge core library — profile types, settings, errors.
//!
//! - [`types`] — profile kinds and sources
//! - [`settings`] — data directory, update interval, destination path
//! - [`error`] — [`ConfigError`]

pub mod error;
pub mod settings;
pub mod types;

pub use error::ConfigError;
pub use settings::{parse_interval, Settings};
pub use types::{is_supported_profile, snapshot_path, ProfileKind, ProfileSource};
