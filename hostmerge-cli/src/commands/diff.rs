//! `hostmerge diff` — show what sync would change in the hosts file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hostmerge_sync::{diff_hosts, Pipeline};

#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, data_dir: Option<PathBuf>) -> Result<()> {
        let settings = super::load_settings(data_dir)?;
        let pipeline = Pipeline::new(&settings);

        let Some(diff) = diff_hosts(&pipeline).context("diff failed")? else {
            println!(
                "No profiles found in {}; sync would not touch the hosts file.",
                settings.data_dir.display()
            );
            return Ok(());
        };

        if diff.is_empty() {
            println!("No differences for {}.", diff.path.display());
            return Ok(());
        }

        print!("{}", diff.unified_diff);
        if !diff.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
