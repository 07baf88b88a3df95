//! Dry-run unified diff support for `hostmerge diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::{error::io_err, reader::END_BANNER_PREFIX, Pipeline, SyncError};

/// Placeholder substituted for end-banner timestamps before comparing.
const MASKED_TIMESTAMP: &str = "<timestamp>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsDiff {
    pub path: PathBuf,
    /// Empty when the destination already matches.
    pub unified_diff: String,
}

impl HostsDiff {
    pub fn is_empty(&self) -> bool {
        self.unified_diff.is_empty()
    }
}

/// Render what a cycle would write and compare it to the current destination.
///
/// No files are written. Returns `None` when there are no profiles, since a
/// cycle would leave the destination alone. End-banner timestamps are masked
/// on both sides so only content changes show up.
pub fn diff_hosts(pipeline: &Pipeline) -> Result<Option<HostsDiff>, SyncError> {
    let Some(assembly) = pipeline.assemble()? else {
        return Ok(None);
    };
    let path = pipeline.hosts_file().to_path_buf();
    let rendered = mask_timestamps(&assembly.text());
    let existing = mask_timestamps(&read_existing_or_empty(&path)?);

    if existing == rendered {
        return Ok(Some(HostsDiff {
            path,
            unified_diff: String::new(),
        }));
    }

    let header = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hosts".to_string());
    let unified = TextDiff::from_lines(&existing, &rendered)
        .unified_diff()
        .header(&format!("a/{header}"), &format!("b/{header}"))
        .context_radius(3)
        .to_string();

    Ok(Some(HostsDiff {
        path,
        unified_diff: unified,
    }))
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.replace("\r\n", "\n")),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn mask_timestamps(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.starts_with(END_BANNER_PREFIX) {
                format!("{END_BANNER_PREFIX}{MASKED_TIMESTAMP}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
