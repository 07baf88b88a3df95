//! `hostmerge sync` — run one update cycle now.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hostmerge_sync::{CycleOutcome, CycleReport, Pipeline, WriteResult};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Render everything but leave the hosts file untouched.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the cycle report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, data_dir: Option<PathBuf>) -> Result<()> {
        let settings = super::load_settings(data_dir)?;
        let pipeline = Pipeline::new(&settings);
        let report = pipeline.run(self.dry_run).with_context(|| {
            format!(
                "update cycle failed for '{}'",
                settings.data_dir.display()
            )
        })?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize cycle report")?
            );
            return Ok(());
        }

        print_report(&report, pipeline.data_dir().display().to_string());
        Ok(())
    }
}

fn print_report(report: &CycleReport, data_dir: String) {
    let (prefix, path, bytes) = match &report.outcome {
        CycleOutcome::NoProfiles => {
            println!("No profiles found in {data_dir}; hosts file left unchanged.");
            return;
        }
        CycleOutcome::Committed(WriteResult::Written { path, bytes }) => ("", path, bytes),
        CycleOutcome::Committed(WriteResult::WouldWrite { path, bytes }) => {
            ("[dry-run] ", path, bytes)
        }
    };

    println!(
        "{prefix}✓ {} ({} profiles, {} failed, {bytes} bytes, {}ms)",
        path.display(),
        report.profiles.len(),
        report.failed_profiles(),
        report.duration_ms,
    );
    for profile in &report.profiles {
        let marker = match profile.status.as_str() {
            "fresh" => "✓",
            "snapshot" => "~",
            _ => "✗",
        };
        match &profile.reason {
            Some(reason) => println!("  {marker}  {} ({reason})", profile.name),
            None => println!("  {marker}  {}", profile.name),
        }
    }
}
