//! `hostmerge init`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, data_dir: Option<PathBuf>) -> Result<()> {
        let settings = super::load_settings(data_dir)?;
        settings.ensure_data_dir().with_context(|| {
            format!(
                "failed to create data directory '{}'",
                settings.data_dir.display()
            )
        })?;

        println!("✓ Data directory ready: {}", settings.data_dir.display());
        println!("  Add `<name>.local` files with hosts lines, or `<name>.remote` files");
        println!("  whose first line is a URL. Destination: {}", settings.hosts_file.display());
        Ok(())
    }
}
