//! `hostmerge list` — discovered profiles and snapshot freshness.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use hostmerge_core::{ProfileKind, ProfileSource};
use hostmerge_sync::{collect, snapshot};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self, data_dir: Option<PathBuf>) -> Result<()> {
        let settings = super::load_settings(data_dir)?;
        let files = collect(&settings.data_dir).with_context(|| {
            format!(
                "cannot read '{}' — run `hostmerge init` first",
                settings.data_dir.display()
            )
        })?;

        let rows: Vec<ProfileRow> = files
            .into_iter()
            .filter_map(ProfileSource::classify)
            .map(|source| ProfileRow::inspect(&source))
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize profile list")?
            );
            return Ok(());
        }

        print_table(&settings.data_dir, rows);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ProfileRow {
    name: String,
    kind: ProfileKind,
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    snapshot_at: Option<String>,
    #[serde(skip)]
    snapshot_age: Option<String>,
}

impl ProfileRow {
    fn inspect(source: &ProfileSource) -> Self {
        let (url, snapshot_at) = match source.kind {
            ProfileKind::Local => (None, None),
            ProfileKind::Remote => (first_line(&source.path), snapshot::modified_at(&source.path)),
        };
        Self {
            name: source.display_name(),
            kind: source.kind,
            path: source.path.clone(),
            url,
            snapshot_at: snapshot_at.map(|at| at.to_rfc3339()),
            snapshot_age: snapshot_at.map(format_age),
        }
    }
}

#[derive(Tabled)]
struct ProfileTableRow {
    #[tabled(rename = "profile")]
    name: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "snapshot")]
    snapshot: String,
}

fn print_table(data_dir: &Path, rows: Vec<ProfileRow>) {
    println!(
        "hostmerge v{} | {} | {} profiles",
        env!("CARGO_PKG_VERSION"),
        data_dir.display(),
        rows.len()
    );
    if rows.is_empty() {
        println!("No profiles found.");
        return;
    }

    let table_rows: Vec<ProfileTableRow> = rows
        .into_iter()
        .map(|row| {
            let snapshot = match (row.kind, row.snapshot_age) {
                (ProfileKind::Local, _) => "-".bright_black().to_string(),
                (ProfileKind::Remote, Some(age)) => format!("{} ago", age).green().to_string(),
                (ProfileKind::Remote, None) => "none".yellow().to_string(),
            };
            let source = match row.kind {
                ProfileKind::Local => "file".to_string(),
                ProfileKind::Remote => row.url.unwrap_or_else(|| "(no url)".red().to_string()),
            };
            ProfileTableRow {
                name: row.name,
                kind: row.kind.to_string(),
                source,
                snapshot,
            }
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn first_line(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let line = text.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}

fn format_age(at: DateTime<Local>) -> String {
    let seconds = Local::now().signed_duration_since(at).num_seconds().max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
