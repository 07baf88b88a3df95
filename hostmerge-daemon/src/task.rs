//! Update task: coalesces update requests into at most one running cycle.
//!
//! ```text
//!            request (sets pending)
//!   ┌──────┐ ─────────────────────▶ ┌──────┐
//!   │ Idle │   wake + settle,        │ Idle │ pending
//!   └──────┘   pending taken         └──────┘
//!       ▲             │
//!       │             ▼
//!       │        ┌─────────┐  request while running:
//!       └─────── │ Running │  pending set, honored on
//!                └─────────┘  the next wakeup
//! ```
//!
//! Triggers only ever touch the pending flag through [`UpdateHandle`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, Notify};

use hostmerge_sync::{CycleOutcome, CycleReport, Pipeline, SyncError, WriteResult};

use crate::error::DaemonError;

/// Delay between a wakeup and taking the pending flag, so that a burst of
/// filesystem events collapses into one cycle.
pub const SETTLE_WINDOW: Duration = Duration::from_secs(1);

/// One blocking update cycle.
pub trait UpdateCycle: Send + Sync + 'static {
    fn run_cycle(&self) -> Result<CycleReport, SyncError>;
}

impl UpdateCycle for Pipeline {
    fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        self.run(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
}

#[derive(Debug)]
struct Flags {
    pending: bool,
    state: TaskState,
    completed: u64,
}

#[derive(Debug)]
struct Shared {
    flags: Mutex<Flags>,
    wake: Notify,
}

impl Shared {
    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// UpdateHandle
// ---------------------------------------------------------------------------

/// Cloneable request side of an [`UpdateTask`].
#[derive(Debug, Clone)]
pub struct UpdateHandle {
    shared: Arc<Shared>,
}

impl UpdateHandle {
    /// Ask for a cycle at the next opportunity. Never blocks on a running cycle.
    pub fn request_immediate_update(&self) {
        self.shared.flags().pending = true;
        self.shared.wake.notify_one();
    }

    pub fn is_pending(&self) -> bool {
        self.shared.flags().pending
    }

    pub fn state(&self) -> TaskState {
        self.shared.flags().state
    }

    /// Cycles finished since the task was created, successful or not.
    pub fn completed_cycles(&self) -> u64 {
        self.shared.flags().completed
    }
}

// ---------------------------------------------------------------------------
// UpdateTask
// ---------------------------------------------------------------------------

pub struct UpdateTask<C> {
    shared: Arc<Shared>,
    cycle: Arc<C>,
    settle: Duration,
}

impl<C: UpdateCycle> UpdateTask<C> {
    /// Starts with the pending flag set, so the first wakeup runs a cycle.
    pub fn new(cycle: C) -> Self {
        let shared = Arc::new(Shared {
            flags: Mutex::new(Flags {
                pending: true,
                state: TaskState::Idle,
                completed: 0,
            }),
            wake: Notify::new(),
        });
        shared.wake.notify_one();
        Self {
            shared,
            cycle: Arc::new(cycle),
            settle: SETTLE_WINDOW,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn handle(&self) -> UpdateHandle {
        UpdateHandle {
            shared: self.shared.clone(),
        }
    }

    /// Scheduling loop. Returns once `shutdown` fires; a running cycle is
    /// finished first.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), DaemonError> {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = self.shared.wake.notified() => {
                    if !self.settle.is_zero() {
                        tokio::time::sleep(self.settle).await;
                    }
                    if !self.begin_cycle() {
                        continue;
                    }

                    let cycle = self.cycle.clone();
                    let result = tokio::task::spawn_blocking(move || cycle.run_cycle()).await;
                    self.finish_cycle();

                    match result {
                        Ok(Ok(report)) => log_report(&report),
                        Ok(Err(err)) => {
                            tracing::error!(error = %err, "update cycle failed, hosts file unchanged");
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "update cycle panicked");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Test-and-clear the pending flag; `true` means the caller now owns the
    /// `Running` state.
    fn begin_cycle(&self) -> bool {
        let mut flags = self.shared.flags();
        if !flags.pending {
            return false;
        }
        flags.pending = false;
        flags.state = TaskState::Running;
        true
    }

    fn finish_cycle(&self) {
        let mut flags = self.shared.flags();
        flags.state = TaskState::Idle;
        flags.completed += 1;
    }
}

fn log_report(report: &CycleReport) {
    match &report.outcome {
        CycleOutcome::NoProfiles => {
            tracing::info!(duration_ms = report.duration_ms, "no profiles found, skipped");
        }
        CycleOutcome::Committed(WriteResult::Written { path, bytes })
        | CycleOutcome::Committed(WriteResult::WouldWrite { path, bytes }) => {
            tracing::info!(
                hosts_file = %path.display(),
                bytes = *bytes,
                profiles = report.profiles.len(),
                failed = report.failed_profiles(),
                duration_ms = report.duration_ms,
                "hosts file updated",
            );
        }
    }
}
