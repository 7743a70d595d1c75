//! Periodic tick source for the timer engine.
//!
//! The engine does not own its clock loop. This driver calls
//! [`TimerEngine::tick`] at a fixed cadence while holding the engine lock,
//! so ticks never overlap each other or a concurrent toggle/select.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::timer::TimerEngine;

/// Default tick cadence in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Ticks `engine` every `period` forever.
///
/// Should be spawned as a separate tokio task and aborted on shutdown.
pub async fn run_ticker(engine: Arc<Mutex<TimerEngine>>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut engine = engine.lock().await;
        if engine.is_running() && engine.tick() {
            tracing::debug!("Countdown completed on tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::timer::{ManualClock, TimerEvent};
    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn create_engine() -> (
        Arc<Mutex<TimerEngine>>,
        mpsc::UnboundedReceiver<TimerEvent>,
        Arc<ManualClock>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let engine = TimerEngine::with_clock(None, tx, clock.clone());
        (Arc::new(Mutex::new(engine)), rx, clock)
    }

    #[tokio::test]
    async fn test_ticker_updates_display() {
        let (engine, mut rx, clock) = create_engine();
        engine.lock().await.toggle();
        let _ = rx.recv().await;

        let mut current = engine.lock().await.subscribe_current();
        let handle = tokio::spawn(run_ticker(engine.clone(), Duration::from_millis(10)));

        clock.advance(chrono::Duration::seconds(65));
        let result = timeout(Duration::from_secs(2), current.changed()).await;
        handle.abort();

        assert!(result.is_ok(), "Display should change within the timeout");
        assert_eq!(engine.lock().await.current().display, "23:55");
    }

    #[tokio::test]
    async fn test_ticker_fires_completion_once() {
        let (engine, mut rx, clock) = create_engine();
        engine.lock().await.toggle();
        let _ = rx.recv().await;

        let handle = tokio::spawn(run_ticker(engine.clone(), Duration::from_millis(10)));
        clock.advance(chrono::Duration::minutes(26));

        let event = timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(matches!(event, Ok(Some(TimerEvent::Completed { .. }))));

        // Give the ticker a few more rounds; nothing else should arrive.
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(rx.try_recv().is_err());
        assert!(!engine.lock().await.is_running());
    }

    #[tokio::test]
    async fn test_ticker_idle_emits_nothing() {
        let (engine, mut rx, _clock) = create_engine();

        let handle = tokio::spawn(run_ticker(engine.clone(), Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(rx.try_recv().is_err());
    }
}
