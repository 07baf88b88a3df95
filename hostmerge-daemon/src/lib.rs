//! Daemon runtime: update task + timer and watcher triggers.

mod error;
pub mod runtime;
pub mod task;
pub mod triggers;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, start_blocking, LogFormat};
pub use task::{TaskState, UpdateCycle, UpdateHandle, UpdateTask, SETTLE_WINDOW};
