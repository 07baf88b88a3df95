//! Watcher-driven update cycles against a real temp data directory.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hostmerge_core::Settings;
use hostmerge_daemon::triggers::watcher_task;
use hostmerge_daemon::{UpdateCycle, UpdateHandle, UpdateTask};
use hostmerge_sync::{CycleOutcome, CycleReport, Pipeline, SyncError};
use tempfile::TempDir;
use tokio::sync::broadcast;

#[derive(Clone, Default)]
struct Counting {
    runs: Arc<AtomicUsize>,
}

impl UpdateCycle for Counting {
    fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(CycleReport {
            profiles: Vec::new(),
            outcome: CycleOutcome::NoProfiles,
            duration_ms: 0,
        })
    }
}

async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    check()
}

struct Running {
    handle: UpdateHandle,
    shutdown: broadcast::Sender<()>,
    tasks: Vec<tokio::task::JoinHandle<Result<(), hostmerge_daemon::DaemonError>>>,
}

impl Running {
    async fn stop(self) {
        let _ = self.shutdown.send(());
        for task in self.tasks {
            task.await.expect("join").expect("task result");
        }
    }
}

fn start<C: UpdateCycle>(cycle: C, data_dir: &std::path::Path) -> Running {
    let task = UpdateTask::new(cycle).with_settle(Duration::from_millis(100));
    let handle = task.handle();
    let (shutdown, _) = broadcast::channel(4);
    let scheduler = tokio::spawn(task.run(shutdown.subscribe()));
    let watcher = tokio::spawn(watcher_task(
        handle.clone(),
        data_dir.to_path_buf(),
        shutdown.subscribe(),
    ));
    Running {
        handle,
        shutdown,
        tasks: vec![scheduler, watcher],
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn only_profile_changes_trigger_a_cycle() {
    let tmp = TempDir::new().expect("tmp");
    let cycle = Counting::default();
    let runs = cycle.runs.clone();
    let running = start(cycle, tmp.path());

    assert!(
        wait_until(Duration::from_secs(5), || running.handle.completed_cycles() >= 1).await,
        "startup cycle never ran"
    );
    // Let the watch register before touching files.
    tokio::time::sleep(Duration::from_millis(300)).await;

    fs::write(tmp.path().join("notes.txt"), "not a profile").unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1, "notes.txt must not trigger");

    fs::write(tmp.path().join("a.local"), "1.2.3.4 a.test\n").unwrap();
    assert!(
        wait_until(Duration::from_secs(5), || runs.load(Ordering::SeqCst) >= 2).await,
        "writing a.local never triggered a cycle"
    );

    running.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn new_profile_lands_in_hosts_file() {
    let tmp = TempDir::new().expect("tmp");
    let data = tmp.path().join("profiles");
    fs::create_dir_all(&data).unwrap();
    let hosts = tmp.path().join("hosts");
    fs::write(&hosts, "").unwrap();
    let pipeline = Pipeline::new(&Settings::new(&data).with_hosts_file(&hosts));
    let running = start(pipeline, &data);

    assert!(wait_until(Duration::from_secs(5), || running.handle.completed_cycles() >= 1).await);
    // No profiles yet: destination untouched.
    assert_eq!(fs::read_to_string(&hosts).unwrap(), "");
    tokio::time::sleep(Duration::from_millis(300)).await;

    fs::write(data.join("lan.local"), "10.0.0.1 nas.lan\n").unwrap();

    let landed = wait_until(Duration::from_secs(5), || {
        fs::read_to_string(&hosts)
            .map(|text| text.contains("# profile begin: lan.local") && text.contains("10.0.0.1 nas.lan"))
            .unwrap_or(false)
    })
    .await;
    assert!(landed, "hosts: {:?}", fs::read_to_string(&hosts));

    running.stop().await;
}
