//! `hostmerge start` — run the daemon in the foreground.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use hostmerge_core::parse_interval;
use hostmerge_daemon::{LogFormat, SETTLE_WINDOW};

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Period of the timer trigger, e.g. `1h`, `30m`, `1h30m`, `90`.
    #[arg(long, value_name = "DURATION", value_parser = parse_interval_arg)]
    pub update_interval: Option<Duration>,

    /// Delay after a wakeup before a cycle starts, in milliseconds.
    #[arg(long, value_name = "N")]
    pub settle_ms: Option<u64>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl StartArgs {
    pub fn run(self, data_dir: Option<PathBuf>) -> Result<()> {
        let mut settings = super::load_settings(data_dir)?;
        if let Some(interval) = self.update_interval {
            settings = settings.with_update_interval(interval);
        }
        let settle = self
            .settle_ms
            .map(Duration::from_millis)
            .unwrap_or(SETTLE_WINDOW);
        let format = if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        };

        hostmerge_daemon::start_blocking(settings, settle, format).context("daemon exited with error")
    }
}

fn parse_interval_arg(raw: &str) -> Result<Duration, String> {
    parse_interval(raw).map_err(|err| err.to_string())
}
