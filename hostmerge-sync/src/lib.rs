//! # hostmerge-sync
//!
//! Profile collection, rendering, and the hosts file writer.
//!
//! Call [`pipeline::Pipeline::run`] to execute one full update cycle:
//! collect profiles, render each into a block, and commit the assembled text.

pub mod collector;
pub mod diff;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod snapshot;
pub mod writer;

pub use collector::collect;
pub use diff::{diff_hosts, HostsDiff};
pub use error::{SnapshotError, SourceError, SyncError};
pub use pipeline::{Assembly, CycleOutcome, CycleReport, Pipeline, ProfileReport};
pub use reader::{BlockStatus, ProfileReader, RenderedBlock};
pub use writer::{commit, WriteResult};
