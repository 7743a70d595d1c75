//! Timer engine for the Pomodoro Timer.
//!
//! This module provides the single-countdown state machine:
//! - Two states: idle (no alert) and running (exactly one alert)
//! - Remaining time computed from wall-clock deltas, so a countdown stays
//!   correct across suspend/resume and missed ticks
//! - Lifecycle events (started, cancelled, completed) on an mpsc channel
//! - Countdown label changes on a watch channel
//! - Reconciliation with a reminder scheduled before the process started

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{mpsc, watch};

use crate::catalog::IntervalCatalog;
use crate::types::{Alert, CurrentInterval, IntervalType, PendingNotification, TimerSnapshot};

// ============================================================================
// Clock
// ============================================================================

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jumps to an absolute time.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// TimerEvent
// ============================================================================

/// Lifecycle events. Each carries the full alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A new countdown began
    Started {
        /// The new alert
        alert: Alert,
    },
    /// The countdown was stopped by the user before completion
    Cancelled {
        /// The alert that was cancelled
        alert: Alert,
    },
    /// The countdown reached zero
    Completed {
        /// The alert that completed
        alert: Alert,
    },
}

impl TimerEvent {
    /// Returns the alert carried by the event.
    pub fn alert(&self) -> &Alert {
        match self {
            TimerEvent::Started { alert }
            | TimerEvent::Cancelled { alert }
            | TimerEvent::Completed { alert } => alert,
        }
    }

    /// Returns the event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerEvent::Started { .. } => "started",
            TimerEvent::Cancelled { .. } => "cancelled",
            TimerEvent::Completed { .. } => "completed",
        }
    }
}

// ============================================================================
// TimerError
// ============================================================================

/// Signals returned by the engine. None of them change engine state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The active interval cannot change while a countdown is running.
    #[error("Cannot switch interval while {running} is running")]
    SelectionRejected {
        /// Interval of the running countdown
        running: IntervalType,
    },
}

// ============================================================================
// Display formatting
// ============================================================================

/// Formats whole seconds as `mm:ss`. Negative values clamp to `00:00`.
pub fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Whole seconds left until the alert finishes.
fn remaining_seconds(alert: &Alert, now: DateTime<Utc>) -> i64 {
    (alert.finish() - now).num_seconds()
}

fn full_display(interval: IntervalType) -> String {
    format_remaining(interval.duration().num_seconds())
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the active selection and the single running alert.
pub struct TimerEngine {
    /// Interval shown and used for the next countdown
    selection: IntervalType,
    /// The in-flight countdown, if any
    alert: Option<Alert>,
    /// Publishes selection/label changes
    current_tx: watch::Sender<CurrentInterval>,
    /// Lifecycle event sender
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    /// Wall clock
    clock: Arc<dyn Clock>,
}

impl TimerEngine {
    /// Creates an engine on the system clock.
    ///
    /// See [`TimerEngine::with_clock`] for how `seed` is handled.
    pub fn new(
        seed: Option<PendingNotification>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self::with_clock(seed, event_tx, Arc::new(SystemClock))
    }

    /// Creates an engine reading time from `clock`.
    ///
    /// Without a seed the engine starts idle with the first catalog entry
    /// selected. With a seed whose identity resolves, the engine adopts the
    /// seeded countdown directly (no `Started` event, since the alert
    /// already exists outside the process) and the next tick reports it as
    /// completed if it is already due. An unresolvable seed is logged and
    /// ignored.
    pub fn with_clock(
        seed: Option<PendingNotification>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let first = IntervalCatalog::first();
        let (current_tx, _) = watch::channel(CurrentInterval {
            interval: first,
            display: full_display(first),
        });

        let mut engine = Self {
            selection: first,
            alert: None,
            current_tx,
            event_tx,
            clock,
        };

        if let Some(seed) = seed {
            engine.adopt(seed);
        }

        engine
    }

    fn adopt(&mut self, seed: PendingNotification) {
        let interval = match IntervalCatalog::lookup(&seed.id) {
            Ok(interval) => interval,
            Err(e) => {
                tracing::warn!("Ignoring scheduled reminder: {}", e);
                return;
            }
        };

        let alert = Alert::finishing_at(seed.completed, interval);
        let ahead = alert.finish() - self.clock.now();
        if ahead > interval.duration() {
            tracing::warn!(
                interval = interval.id(),
                finish = %alert.finish(),
                "Scheduled reminder finishes {} minutes from now, longer than the interval itself",
                ahead.num_minutes()
            );
        }
        tracing::info!(
            interval = interval.id(),
            finish = %alert.finish(),
            "Resuming scheduled countdown"
        );

        self.set(interval);
        self.alert = Some(alert);
        self.start();
    }

    /// Returns every interval type in display order.
    pub fn items(&self) -> &'static [IntervalType] {
        IntervalCatalog::all()
    }

    /// Returns the active selection and its countdown label.
    pub fn current(&self) -> CurrentInterval {
        self.current_tx.borrow().clone()
    }

    /// Subscribes to changes of the active selection or its label.
    pub fn subscribe_current(&self) -> watch::Receiver<CurrentInterval> {
        self.current_tx.subscribe()
    }

    /// Returns the active selection.
    pub fn selection(&self) -> IntervalType {
        self.selection
    }

    /// Returns true while a countdown is active.
    pub fn is_running(&self) -> bool {
        self.alert.is_some()
    }

    /// Returns the running alert, if any.
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Returns a point-in-time view of the engine.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            current: self.current(),
            alert: self.alert.clone(),
        }
    }

    /// Changes the active selection.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::SelectionRejected`] while running. Nothing is
    /// changed and no event is emitted; the caller decides how to tell the user.
    pub fn select(&mut self, interval: IntervalType) -> Result<(), TimerError> {
        if let Some(alert) = &self.alert {
            return Err(TimerError::SelectionRejected {
                running: alert.interval(),
            });
        }

        self.set(interval);
        Ok(())
    }

    /// Starts the countdown if idle, cancels it if running.
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Starts a countdown for the active selection.
    ///
    /// Calling this while running keeps the existing alert untouched and
    /// only refreshes the label.
    pub fn start(&mut self) {
        let now = self.clock.now();

        let remaining = match &self.alert {
            Some(alert) => remaining_seconds(alert, now),
            None => {
                let alert = Alert::starting_at(now, self.selection);
                let remaining = remaining_seconds(&alert, now);
                self.alert = Some(alert.clone());
                self.emit(TimerEvent::Started { alert });
                remaining
            }
        };

        self.publish(self.selection, format_remaining(remaining));
    }

    /// Cancels the running countdown. Does nothing while idle.
    pub fn stop(&mut self) {
        let Some(alert) = self.alert.take() else {
            return;
        };

        self.emit(TimerEvent::Cancelled { alert });
        self.set(self.selection);
    }

    /// Recomputes the remaining time from the wall clock.
    ///
    /// Updates the label while time remains, otherwise emits `Completed`
    /// and returns to idle. Does nothing while idle.
    ///
    /// Returns true if this tick completed the countdown.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let remaining = match &self.alert {
            Some(alert) => remaining_seconds(alert, now),
            None => return false,
        };

        if remaining > 0 {
            self.publish(self.selection, format_remaining(remaining));
            return false;
        }

        if let Some(alert) = self.alert.take() {
            self.emit(TimerEvent::Completed { alert });
        }
        self.set(self.selection);
        true
    }

    /// Selects `interval` and shows its full duration.
    fn set(&mut self, interval: IntervalType) {
        self.selection = interval;
        self.publish(interval, full_display(interval));
    }

    fn publish(&self, interval: IntervalType, display: String) {
        self.current_tx.send_if_modified(|current| {
            if current.interval == interval && current.display == display {
                return false;
            }
            current.interval = interval;
            current.display = display;
            true
        });
    }

    fn emit(&self, event: TimerEvent) {
        tracing::info!(
            event = event.as_str(),
            interval = event.alert().interval().id(),
            "{}",
            event.alert()
        );

        if self.event_tx.send(event).is_err() {
            tracing::debug!("Timer event receiver dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
