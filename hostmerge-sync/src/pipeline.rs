//! Update cycle: collect → render → commit.
//!
//! Shared by `hostmerge sync` and the daemon's update task.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use hostmerge_core::{ProfileKind, Settings};

use crate::collector::collect;
use crate::reader::{BlockStatus, ProfileReader, RenderedBlock};
use crate::writer::{commit, WriteResult};
use crate::SyncError;

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Rendered blocks in collector order.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub blocks: Vec<RenderedBlock>,
}

impl Assembly {
    /// The full hosts file text: every block's lines joined with `\n`.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .flat_map(RenderedBlock::lines)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What happened to one profile during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileReport {
    pub name: String,
    pub kind: Option<ProfileKind>,
    /// `fresh`, `snapshot`, or `failed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&RenderedBlock> for ProfileReport {
    fn from(block: &RenderedBlock) -> Self {
        let (status, reason) = match &block.status {
            BlockStatus::Fresh => ("fresh", None),
            BlockStatus::Snapshot { reason } => ("snapshot", Some(reason.clone())),
            BlockStatus::Failed { reason } => ("failed", Some(reason.clone())),
        };
        Self {
            name: block.name.clone(),
            kind: block.kind,
            status: status.to_string(),
            reason,
        }
    }
}

/// End state of a cycle that did not error out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The data directory holds no profiles; the destination was left alone.
    NoProfiles,
    Committed(WriteResult),
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub profiles: Vec<ProfileReport>,
    pub outcome: CycleOutcome,
    pub duration_ms: u128,
}

impl CycleReport {
    pub fn failed_profiles(&self) -> usize {
        self.profiles.iter().filter(|p| p.status == "failed").count()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Everything one cycle needs; cheap to share across cycles.
#[derive(Debug, Clone)]
pub struct Pipeline {
    data_dir: PathBuf,
    hosts_file: PathBuf,
    reader: ProfileReader,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
            hosts_file: settings.hosts_file.clone(),
            reader: ProfileReader::new(settings.fetch_timeout),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn hosts_file(&self) -> &Path {
        &self.hosts_file
    }

    /// Collect and render every profile, sequentially and in order.
    ///
    /// Returns `None` when there are no profiles.
    pub fn assemble(&self) -> Result<Option<Assembly>, SyncError> {
        let files = collect(&self.data_dir)?;
        if files.is_empty() {
            return Ok(None);
        }
        let blocks = files.iter().map(|path| self.reader.render(path)).collect();
        Ok(Some(Assembly { blocks }))
    }

    /// Run one full update cycle.
    pub fn run(&self, dry_run: bool) -> Result<CycleReport, SyncError> {
        let started = Instant::now();

        let Some(assembly) = self.assemble()? else {
            tracing::info!(
                "no profiles in {}, hosts file left unchanged",
                self.data_dir.display()
            );
            return Ok(CycleReport {
                profiles: Vec::new(),
                outcome: CycleOutcome::NoProfiles,
                duration_ms: started.elapsed().as_millis(),
            });
        };

        let profiles = assembly.blocks.iter().map(ProfileReport::from).collect();
        let written = commit(&self.hosts_file, &assembly.text(), dry_run)?;

        Ok(CycleReport {
            profiles,
            outcome: CycleOutcome::Committed(written),
            duration_ms: started.elapsed().as_millis(),
        })
    }
}
