pub mod diff;
pub mod init;
pub mod list;
pub mod start;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use hostmerge_core::Settings;

/// `--data-dir` wins; otherwise `~/.hosts`.
pub(crate) fn load_settings(data_dir: Option<PathBuf>) -> Result<Settings> {
    match data_dir {
        Some(dir) => Ok(Settings::new(dir)),
        None => Settings::from_home().context("could not determine home directory"),
    }
}
