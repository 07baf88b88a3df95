//! Trigger sources: the periodic timer and the data-directory watcher.
//!
//! Both only call [`UpdateHandle::request_immediate_update`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use hostmerge_core::is_supported_profile;

use crate::error::DaemonError;
use crate::task::UpdateHandle;

/// Request an update every `interval`. The first request comes one full
/// interval after start; the startup cycle is already pending.
pub async fn timer_task(
    handle: UpdateHandle,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                tracing::info!(interval_secs = interval.as_secs(), "update interval elapsed");
                handle.request_immediate_update();
            }
        }
    }
    Ok(())
}

/// Request an update whenever a profile under `data_dir` is created,
/// modified, renamed, or removed.
pub async fn watcher_task(
    handle: UpdateHandle,
    data_dir: PathBuf,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(&data_dir, RecursiveMode::Recursive)?;
    tracing::info!(path = %data_dir.display(), "watching data directory");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if let Some(path) = triggering_path(&event) {
                    tracing::debug!(path = %path.display(), kind = ?event.kind, "profile changed");
                    handle.request_immediate_update();
                }
            }
        }
    }

    Ok(())
}

/// Create, remove, and content/name modifications; metadata-only changes
/// and accesses are ignored.
pub fn is_relevant_event_kind(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// The first profile path of a relevant event, if any.
pub fn triggering_path(event: &Event) -> Option<&Path> {
    if !is_relevant_event_kind(&event.kind) {
        return None;
    }
    event
        .paths
        .iter()
        .map(PathBuf::as_path)
        .find(|path| is_supported_profile(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn profile_writes_trigger() {
        let cases = [
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            EventKind::Remove(RemoveKind::File),
        ];
        for kind in cases {
            let e = event(kind, "/data/lan.local");
            assert_eq!(
                triggering_path(&e),
                Some(Path::new("/data/lan.local")),
                "kind: {kind:?}"
            );
        }
    }

    #[test]
    fn metadata_and_access_do_not_trigger() {
        let chmod = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            "/data/lan.local",
        );
        let read = event(EventKind::Access(AccessKind::Any), "/data/lan.local");
        assert!(triggering_path(&chmod).is_none());
        assert!(triggering_path(&read).is_none());
    }

    #[test]
    fn snapshots_and_other_files_do_not_trigger() {
        let snapshot = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Any)),
            "/data/ads.remote.history",
        );
        let notes = event(EventKind::Create(CreateKind::File), "/data/notes.txt");
        assert!(triggering_path(&snapshot).is_none());
        assert!(triggering_path(&notes).is_none());
    }

    #[test]
    fn rename_pair_triggers_on_profile_side() {
        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/data/draft.tmp"))
            .add_path(PathBuf::from("/data/office.remote"));
        assert_eq!(
            triggering_path(&rename),
            Some(Path::new("/data/office.remote"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_requests_after_each_interval() {
        use crate::task::{UpdateCycle, UpdateTask};
        use hostmerge_sync::{CycleOutcome, CycleReport, SyncError};

        struct Noop;
        impl UpdateCycle for Noop {
            fn run_cycle(&self) -> Result<CycleReport, SyncError> {
                Ok(CycleReport {
                    profiles: Vec::new(),
                    outcome: CycleOutcome::NoProfiles,
                    duration_ms: 0,
                })
            }
        }

        async fn wait_for(handle: &UpdateHandle, cycles: u64) {
            for _ in 0..1000 {
                if handle.completed_cycles() >= cycles {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("cycle {cycles} never completed");
        }

        let task = UpdateTask::new(Noop).with_settle(Duration::ZERO);
        let handle = task.handle();
        let (shutdown_tx, _) = broadcast::channel(1);
        let runner = tokio::spawn(task.run(shutdown_tx.subscribe()));
        let timer = tokio::spawn(timer_task(
            handle.clone(),
            Duration::from_secs(3600),
            shutdown_tx.subscribe(),
        ));

        wait_for(&handle, 1).await;
        tokio::time::sleep(Duration::from_secs(1800)).await;
        assert_eq!(handle.completed_cycles(), 1, "no request before the interval");

        tokio::time::sleep(Duration::from_secs(1801)).await;
        wait_for(&handle, 2).await;

        shutdown_tx.send(()).unwrap();
        timer.await.unwrap().unwrap();
        runner.await.unwrap().unwrap();
    }
}
