use std::time::Duration;

use tokio::sync::broadcast;

use hostmerge_core::Settings;
use hostmerge_sync::Pipeline;

use crate::error::{io_err, DaemonError};
use crate::task::UpdateTask;
use crate::triggers::{timer_task, watcher_task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(
    settings: Settings,
    settle: Duration,
    log_format: LogFormat,
) -> Result<(), DaemonError> {
    init_tracing(log_format);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings, settle))
}

/// Run the daemon: one update task, fed by the timer and the watcher, until
/// ctrl-c or a task failure.
pub async fn run(settings: Settings, settle: Duration) -> Result<(), DaemonError> {
    settings.ensure_data_dir()?;
    tracing::info!(
        data_dir = %settings.data_dir.display(),
        hosts_file = %settings.hosts_file.display(),
        interval_secs = settings.update_interval.as_secs(),
        "starting hostmerge daemon"
    );

    let task = UpdateTask::new(Pipeline::new(&settings)).with_settle(settle);
    let handle = task.handle();
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = task.run(shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let timer_handle = {
        let shutdown = shutdown_tx.clone();
        let handle = handle.clone();
        let interval = settings.update_interval;
        tokio::spawn(async move {
            let result = timer_task(handle, interval, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let data_dir = settings.data_dir.clone();
        tokio::spawn(async move {
            let result = watcher_task(handle, data_dir, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Task {
                            task: "signal_handler",
                            reason: format!("ctrl-c handler failed: {err}"),
                        }),
                    }
                }
            }
        })
    };

    let (scheduler_result, timer_result, watcher_result, signal_result) =
        tokio::join!(scheduler_handle, timer_handle, watcher_handle, signal_handle);

    handle_join("scheduler", scheduler_result)?;
    handle_join("timer", timer_result)?;
    handle_join("watcher", watcher_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("daemon stopped");
    Ok(())
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task {
            task,
            reason: format!("join failure: {err}"),
        }),
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = match format {
        LogFormat::Text => fmt().with_env_filter(filter).with_target(false).try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    };
}
