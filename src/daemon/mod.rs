//! Daemon module for the Pomodoro Timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with the idle/running state machine
//! - `ticker`: Periodic tick source driving the engine
//! - `host`: Reactions to lifecycle events (reminders, completion dialog)
//! - `ipc`: Unix socket server for CLI requests

pub mod host;
pub mod ipc;
pub mod ticker;
pub mod timer;

pub use host::{AlertHost, Dialog, MockDialog, TerminalDialog};
pub use ipc::{IpcServer, RequestHandler};
pub use ticker::run_ticker;
pub use timer::{Clock, ManualClock, SystemClock, TimerEngine, TimerError, TimerEvent};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::scheduler::{FileNotificationScheduler, NotificationScheduler};
use crate::types::{DaemonConfig, PendingNotification};

/// How long shutdown waits for the host to apply queued events.
const HOST_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Reads the reminder left behind by a previous run.
///
/// Failures are logged and treated as "nothing scheduled".
pub fn load_seed(scheduler: &dyn NotificationScheduler) -> Option<PendingNotification> {
    match scheduler.scheduled() {
        Ok(seed) => seed,
        Err(e) => {
            tracing::warn!("Could not read scheduled reminder, starting idle: {}", e);
            if e.is_corrupt() {
                if let Err(e) = scheduler.remove_all() {
                    tracing::warn!("Could not discard corrupt reminder: {}", e);
                }
            }
            None
        }
    }
}

/// Runs the daemon until Ctrl-C.
///
/// Wires the engine (seeded from any still-scheduled reminder) to the tick
/// source, the event host and the IPC server.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the IPC server fails.
pub async fn run_daemon(config: DaemonConfig) -> Result<()> {
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid daemon configuration")?;

    let scheduler = Arc::new(FileNotificationScheduler::new(config.schedule_path.clone()));
    let seed = load_seed(scheduler.as_ref());

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(TimerEngine::new(seed, event_tx)));

    let host = AlertHost::new(scheduler, Arc::new(TerminalDialog));
    let host_task = tokio::spawn(host.run(event_rx));

    let ticker_task = tokio::spawn(run_ticker(
        engine.clone(),
        Duration::from_millis(config.tick_interval_ms),
    ));

    let server = IpcServer::new(&config.socket_path)?;
    let handler = Arc::new(RequestHandler::new(engine.clone()));

    let result = tokio::select! {
        result = server.serve(handler) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")
        }
    };

    tracing::info!("Shutting down");
    drop(server);
    shutdown(engine, ticker_task, host_task).await;
    result
}

/// Stops the tick source, releases the engine and lets the host apply every
/// event still queued before returning.
///
/// The host exits once the last engine handle is dropped and the event
/// channel closes. Connection tasks that still hold the engine get
/// [`HOST_DRAIN_TIMEOUT`] to finish before the host is aborted.
async fn shutdown(
    engine: Arc<Mutex<TimerEngine>>,
    ticker: JoinHandle<()>,
    mut host: JoinHandle<()>,
) {
    ticker.abort();
    let _ = ticker.await;
    drop(engine);

    if timeout(HOST_DRAIN_TIMEOUT, &mut host).await.is_err() {
        tracing::warn!("Timed out applying pending timer events");
        host.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::MockNotificationScheduler;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_load_seed_returns_scheduled() {
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let scheduler =
            MockNotificationScheduler::with_pending(PendingNotification::new("LongBreak", when));

        let seed = load_seed(&scheduler).unwrap();
        assert_eq!(seed.id, "LongBreak");
        assert_eq!(seed.completed, when);
    }

    #[test]
    fn test_load_seed_failure_is_none() {
        let scheduler = MockNotificationScheduler::new();
        scheduler.set_should_fail(true);

        assert!(load_seed(&scheduler).is_none());
    }

    #[test]
    fn test_load_seed_discards_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduled.json");
        std::fs::write(&path, "{broken").unwrap();
        let scheduler = FileNotificationScheduler::new(&path);

        assert!(load_seed(&scheduler).is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_shutdown_applies_queued_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduled.json");
        let scheduler = Arc::new(FileNotificationScheduler::new(&path));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(TimerEngine::new(None, event_tx)));
        let host = AlertHost::new(scheduler, Arc::new(MockDialog::new()));
        let host_task = tokio::spawn(host.run(event_rx));
        let ticker_task = tokio::spawn(run_ticker(engine.clone(), Duration::from_millis(10)));

        engine.lock().await.toggle();
        timeout(Duration::from_secs(2), async {
            while !path.exists() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        // Cancel and shut down before the host has seen the event.
        engine.lock().await.toggle();
        shutdown(engine, ticker_task, host_task).await;

        assert!(!path.exists(), "Cancelled reminder must not survive shutdown");
    }

    #[tokio::test]
    async fn test_shutdown_applies_queued_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduled.json");
        let scheduler = Arc::new(FileNotificationScheduler::new(&path));
        let dialog = Arc::new(MockDialog::new());

        let when = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        scheduler.schedule("ShortBreak", when).unwrap();
        let seed = load_seed(scheduler.as_ref());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(TimerEngine::new(seed, event_tx)));
        let host = AlertHost::new(scheduler, dialog.clone());
        let host_task = tokio::spawn(host.run(event_rx));
        let ticker_task = tokio::spawn(async {});

        assert!(engine.lock().await.tick());
        shutdown(engine, ticker_task, host_task).await;

        assert!(!path.exists());
        assert_eq!(dialog.shown().len(), 1);
    }

    #[tokio::test]
    async fn test_run_daemon_rejects_invalid_config() {
        let config = DaemonConfig::default().with_tick_interval_ms(0);
        let result = run_daemon(config).await;
        assert!(result.is_err());
    }
}
