//! Profile source types.
//!
//! A profile source is any file under the data directory whose extension maps
//! to a [`ProfileKind`]. Everything else in the directory (snapshots, notes,
//! editor swap files) is invisible to hostmerge.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Suffix appended to a remote profile path to locate its cached snapshot.
pub const SNAPSHOT_SUFFIX: &str = ".history";

// ---------------------------------------------------------------------------
// ProfileKind
// ---------------------------------------------------------------------------

/// How a profile source is resolved into hosts lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// File content is used verbatim.
    Local,
    /// First line is a URL; the fetched body is used, with a snapshot fallback.
    Remote,
}

impl ProfileKind {
    /// All supported kinds, in a stable order.
    pub fn all() -> &'static [ProfileKind] {
        &[ProfileKind::Local, ProfileKind::Remote]
    }

    /// File extension (without the dot) that selects this kind.
    pub fn extension(self) -> &'static str {
        match self {
            ProfileKind::Local => "local",
            ProfileKind::Remote => "remote",
        }
    }

    /// Classify a path by its lowercased extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.extension() == ext)
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `true` when `path` carries a supported profile extension.
pub fn is_supported_profile(path: &Path) -> bool {
    ProfileKind::from_path(path).is_some()
}

/// `<path>.history` — pure, no I/O.
pub fn snapshot_path(path: &Path) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(SNAPSHOT_SUFFIX);
    PathBuf::from(raw)
}

// ---------------------------------------------------------------------------
// ProfileSource
// ---------------------------------------------------------------------------

/// A classified profile file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProfileSource {
    pub path: PathBuf,
    pub kind: ProfileKind,
}

impl ProfileSource {
    /// Returns `None` for paths without a supported extension.
    pub fn classify(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = ProfileKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    /// Base name shown in banners and logs.
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        snapshot_path(&self.path)
    }
}

/// Base name of `path`, falling back to the full path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_path_appends_suffix_to_full_name() {
        let path = Path::new("/data/corp.remote");
        assert_eq!(
            snapshot_path(path),
            PathBuf::from("/data/corp.remote.history")
        );
    }

    #[test]
    fn snapshot_files_are_not_profiles() {
        assert!(!is_supported_profile(Path::new("/data/corp.remote.history")));
    }

    #[test]
    fn classify_keeps_path_and_kind() {
        let source = ProfileSource::classify("/data/dev.local").expect("local profile");
        assert_eq!(source.kind, ProfileKind::Local);
        assert_eq!(source.display_name(), "dev.local");
        assert!(ProfileSource::classify("/data/README.md").is_none());
    }

    #[test]
    fn kind_displays_as_its_extension() {
        assert_eq!(ProfileKind::Remote.to_string(), "remote");
        assert_eq!(ProfileKind::Local.to_string(), "local");
    }
}
