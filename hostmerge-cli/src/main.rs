//! hostmerge — merge hosts-file profiles into the system hosts file.
//!
//! # Usage
//!
//! ```text
//! hostmerge [--data-dir <DIR>] start [--update-interval 1h] [--settle-ms 1000] [--log-json]
//! hostmerge [--data-dir <DIR>] sync [--dry-run] [--json]
//! hostmerge [--data-dir <DIR>] diff
//! hostmerge [--data-dir <DIR>] list [--json]
//! hostmerge [--data-dir <DIR>] init
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, init::InitArgs, list::ListArgs, start::StartArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hostmerge",
    version,
    about = "Merge local and remote hosts profiles into the system hosts file",
    long_about = None,
)]
struct Cli {
    /// Profile directory (default: ~/.hosts).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the update daemon in the foreground.
    Start(StartArgs),

    /// Run one update cycle now.
    Sync(SyncArgs),

    /// Show a unified diff of what sync would write.
    Diff(DiffArgs),

    /// List discovered profiles and their snapshots.
    List(ListArgs),

    /// Create the profile directory.
    Init(InitArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir;
    match cli.command {
        Commands::Start(args) => args.run(data_dir),
        Commands::Sync(args) => args.run(data_dir),
        Commands::Diff(args) => args.run(data_dir),
        Commands::List(args) => args.run(data_dir),
        Commands::Init(args) => args.run(data_dir),
    }
}
