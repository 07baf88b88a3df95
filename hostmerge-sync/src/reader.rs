//! Profile reader — one profile file in, one rendered block out.
//!
//! Rendering never fails: a broken profile becomes a block whose body is a
//! single `# error: ...` comment.
//!
//! ```text
//! # profile begin: ads.remote
//! 0.0.0.0 ads.example
//! # profile end, update at 2024-05-01T10:00:00+02:00
//!
//! ```

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat};

use hostmerge_core::{settings::DEFAULT_FETCH_TIMEOUT, types::display_name, ProfileKind};

use crate::error::SourceError;
use crate::snapshot;

/// Comment appended when a remote profile falls back to its snapshot.
pub const SNAPSHOT_FALLBACK_COMMENT: &str = "# remote fetch failed, reusing previous snapshot";
pub const BEGIN_BANNER_PREFIX: &str = "# profile begin: ";
pub const END_BANNER_PREFIX: &str = "# profile end, update at ";

/// Upper bound on a remote profile body; larger bodies fail the fetch.
pub const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

// ---------------------------------------------------------------------------
// RenderedBlock
// ---------------------------------------------------------------------------

/// How the body of a block was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    /// Local content, or a remote body fetched during this render.
    Fresh,
    /// The fetch failed and the cached snapshot was used instead.
    Snapshot { reason: String },
    /// Nothing usable; the body is an error comment.
    Failed { reason: String },
}

/// One profile's contribution to the hosts file.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    pub name: String,
    pub kind: Option<ProfileKind>,
    pub body: Vec<String>,
    pub status: BlockStatus,
    pub generated_at: DateTime<Local>,
}

impl RenderedBlock {
    pub fn begin_banner(&self) -> String {
        format!("{BEGIN_BANNER_PREFIX}{}", self.name)
    }

    pub fn end_banner(&self) -> String {
        format!(
            "{END_BANNER_PREFIX}{}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Banner, body, footer, and the empty separator line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.body.len() + 3);
        lines.push(self.begin_banner());
        lines.extend(self.body.iter().cloned());
        lines.push(self.end_banner());
        lines.push(String::new());
        lines
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, BlockStatus::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// ProfileReader
// ---------------------------------------------------------------------------

/// Renders profile files; holds the HTTP agent shared by remote profiles.
#[derive(Debug, Clone)]
pub struct ProfileReader {
    agent: ureq::Agent,
}

impl Default for ProfileReader {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl ProfileReader {
    /// `timeout` bounds each remote request end to end.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }

    /// Render the profile at `path`.
    pub fn render(&self, path: &Path) -> RenderedBlock {
        let name = display_name(path);
        let kind = ProfileKind::from_path(path);

        let (body, status) = match kind {
            Some(ProfileKind::Local) => match read_local(path) {
                Ok(lines) => {
                    tracing::info!("profile {name} loaded");
                    (lines, BlockStatus::Fresh)
                }
                Err(err) => failed(&name, err),
            },
            Some(ProfileKind::Remote) => self.render_remote(path, &name),
            None => {
                let extension = path
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default();
                failed(&name, SourceError::Unsupported { extension })
            }
        };

        RenderedBlock {
            name,
            kind,
            body,
            status,
            generated_at: Local::now(),
        }
    }

    fn render_remote(&self, path: &Path, name: &str) -> (Vec<String>, BlockStatus) {
        match self.fetch(path) {
            Ok(body) => {
                if let Err(err) = snapshot::save(path, &body) {
                    tracing::warn!("profile {name}: {err}");
                }
                tracing::info!("profile {name} fetched ({} bytes)", body.len());
                (split_lines(&String::from_utf8_lossy(&body)), BlockStatus::Fresh)
            }
            Err(err @ SourceError::ReadRemote(_)) => failed(name, err),
            Err(err) => match snapshot::load(path) {
                Some(cached) => {
                    tracing::warn!("profile {name} update failed ({err}), reusing previous snapshot");
                    let mut lines = split_lines(&cached);
                    lines.push(SNAPSHOT_FALLBACK_COMMENT.to_string());
                    (
                        lines,
                        BlockStatus::Snapshot {
                            reason: err.to_string(),
                        },
                    )
                }
                None => failed(name, err),
            },
        }
    }

    /// GET the URL on the first line of the profile; only `200` counts.
    fn fetch(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let content = std::fs::read(path).map_err(SourceError::ReadRemote)?;
        let content = String::from_utf8_lossy(&content);
        let url = content.lines().next().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(SourceError::MissingUrl);
        }

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(SourceError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(SourceError::Connection(transport.to_string()))
            }
        };
        if response.status() != 200 {
            return Err(SourceError::Status(response.status()));
        }

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(SourceError::Body)?;
        if body.len() as u64 > MAX_BODY_BYTES {
            return Err(SourceError::BodyTooLarge {
                limit: MAX_BODY_BYTES,
            });
        }
        Ok(body)
    }
}

fn read_local(path: &Path) -> Result<Vec<String>, SourceError> {
    let bytes = std::fs::read(path).map_err(SourceError::ReadLocal)?;
    Ok(split_lines(&String::from_utf8_lossy(&bytes)))
}

fn failed(name: &str, err: SourceError) -> (Vec<String>, BlockStatus) {
    tracing::warn!("profile {name} failed to load: {err}");
    (
        vec![format!("# error: {err}")],
        BlockStatus::Failed {
            reason: err.to_string(),
        },
    )
}

/// Split on `\n` after normalising CRLF; a trailing newline yields a final
/// empty line, which is kept.
fn split_lines(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn local_profile_renders_between_banners() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lan.local");
        fs::write(&path, "10.0.0.1 nas.lan\n10.0.0.2 printer.lan").unwrap();

        let block = ProfileReader::default().render(&path);
        let lines = block.lines();

        assert_eq!(block.status, BlockStatus::Fresh);
        assert_eq!(lines[0], "# profile begin: lan.local");
        assert_eq!(lines[1], "10.0.0.1 nas.lan");
        assert_eq!(lines[2], "10.0.0.2 printer.lan");
        assert!(lines[3].starts_with(END_BANNER_PREFIX), "got: {}", lines[3]);
        assert_eq!(lines[4], "");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn end_banner_carries_rfc3339_timestamp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lan.local");
        fs::write(&path, "").unwrap();

        let block = ProfileReader::default().render(&path);
        let banner = block.end_banner();
        let stamp = banner.strip_prefix(END_BANNER_PREFIX).expect("prefix");
        DateTime::parse_from_rfc3339(stamp).expect("rfc3339 timestamp");
    }

    #[test]
    fn crlf_content_is_normalised() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("win.local");
        fs::write(&path, "1.1.1.1 one\r\n2.2.2.2 two").unwrap();

        let block = ProfileReader::default().render(&path);
        assert_eq!(block.body, ["1.1.1.1 one", "2.2.2.2 two"]);
    }

    #[test]
    fn missing_local_profile_renders_error_block() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.local");

        let block = ProfileReader::default().render(&path);

        assert!(block.is_failed());
        assert_eq!(block.body.len(), 1);
        assert!(block.body[0].starts_with("# error: failed to read local profile"));
        assert_eq!(block.lines()[0], "# profile begin: gone.local");
    }

    #[test]
    fn unsupported_extension_renders_error_block() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, "1.2.3.4 hidden").unwrap();

        let block = ProfileReader::default().render(&path);

        assert!(block.is_failed());
        assert_eq!(block.body, ["# error: unsupported file type '.txt'"]);
    }

    #[test]
    fn remote_without_url_and_without_snapshot_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.remote");
        fs::write(&path, "\n").unwrap();

        let block = ProfileReader::default().render(&path);

        assert!(block.is_failed());
        assert!(block.body[0].contains("no URL"));
        assert!(!tmp.path().join("empty.remote.history").exists());
    }

    #[test]
    fn vanished_remote_profile_ignores_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ads.remote");
        fs::write(tmp.path().join("ads.remote.history"), "0.0.0.0 stale.example").unwrap();

        let block = ProfileReader::default().render(&path);

        assert!(block.is_failed(), "status: {:?}", block.status);
        assert_eq!(block.body.len(), 1);
        assert!(block.body[0].starts_with("# error: failed to read remote profile"));
        assert_eq!(
            fs::read_to_string(tmp.path().join("ads.remote.history")).unwrap(),
            "0.0.0.0 stale.example"
        );
    }

    #[test]
    fn remote_without_url_falls_back_to_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ads.remote");
        fs::write(&path, "").unwrap();
        fs::write(tmp.path().join("ads.remote.history"), "0.0.0.0 ads.example").unwrap();

        let block = ProfileReader::default().render(&path);

        assert!(matches!(block.status, BlockStatus::Snapshot { .. }));
        assert_eq!(
            block.body,
            ["0.0.0.0 ads.example", SNAPSHOT_FALLBACK_COMMENT]
        );
    }
}
