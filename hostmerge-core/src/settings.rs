//! Runtime settings.
//!
//! # API pattern
//!
//! - `Settings::default_at(home)` — explicit home; used in tests with `TempDir`
//! - `Settings::from_home()` — derives home from `dirs::home_dir()`
//!
//! The destination hosts file is fixed per platform. The execution
//! environment may point it elsewhere through [`HOSTS_FILE_ENV`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{io_err, ConfigError};

/// Directory name under `$HOME` holding profile sources.
pub const DEFAULT_DATA_DIR_NAME: &str = ".hosts";
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
/// Environment override for the destination hosts file.
pub const HOSTS_FILE_ENV: &str = "HOSTMERGE_HOSTS_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory walked for `.local` / `.remote` profiles.
    pub data_dir: PathBuf,
    /// Period of the timer trigger.
    pub update_interval: Duration,
    /// File rewritten on every update cycle.
    pub hosts_file: PathBuf,
    /// Per-request timeout for remote profiles.
    pub fetch_timeout: Duration,
}

impl Settings {
    /// Defaults for `data_dir`, with the environment-resolved hosts file.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            hosts_file: hosts_file_from_env(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Defaults rooted at an explicit home directory.
    pub fn default_at(home: &Path) -> Self {
        Self::new(default_data_dir_at(home))
    }

    /// Defaults rooted at the current user's home directory.
    pub fn from_home() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(Self::default_at(&home))
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_hosts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosts_file = path.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Create the data directory (mode `0755`) if it does not yet exist.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        let dir = &self.data_dir;
        if dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        set_dir_permissions(dir)
    }
}

/// `<home>/.hosts` — pure, no I/O.
pub fn default_data_dir_at(home: &Path) -> PathBuf {
    home.join(DEFAULT_DATA_DIR_NAME)
}

/// Platform hosts file path.
pub fn system_hosts_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:/Windows/System32/drivers/etc/hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// [`system_hosts_path`] unless [`HOSTS_FILE_ENV`] is set and non-empty.
pub fn hosts_file_from_env() -> PathBuf {
    match std::env::var_os(HOSTS_FILE_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => system_hosts_path(),
    }
}

// ---------------------------------------------------------------------------
// Interval parsing
// ---------------------------------------------------------------------------

/// Parse an interval such as `1h`, `90s`, `1h30m`, `250ms`, or a bare number
/// of seconds.
pub fn parse_interval(input: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidInterval {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let raw = input.trim().to_ascii_lowercase();
    if raw.is_empty() {
        return Err(invalid("empty value"));
    }
    let mut total = Duration::ZERO;
    let mut rest = raw.as_str();
    if let Ok(secs) = raw.parse::<u64>() {
        total = Duration::from_secs(secs);
        rest = "";
    }

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit after number"))?;
        if digits == 0 {
            return Err(invalid("expected a number"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| invalid("number out of range"))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(60 * 60)),
            other => return Err(invalid(&format!("unknown unit '{other}'"))),
        };
        total = total.saturating_add(part);
        rest = &rest[unit_len..];
    }

    if total.is_zero() {
        return Err(invalid("interval must be greater than zero"));
    }
    Ok(total)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
