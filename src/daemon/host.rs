//! Host reactions to timer lifecycle events.
//!
//! The engine only emits events. This module decides what they mean for
//! the outside world:
//! - `Started`: schedule a reminder firing at the alert's finish time
//! - `Cancelled`: remove scheduled reminders
//! - `Completed`: remove the delivered reminder and show a completion summary
//!
//! It also owns the user-facing wording for a rejected interval switch.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::scheduler::{NotificationScheduler, SchedulerError};
use crate::types::{Alert, IntervalType};

use super::timer::TimerEvent;

// ============================================================================
// Dialog
// ============================================================================

/// Surface for messages addressed to the user.
pub trait Dialog: Send + Sync {
    /// Shows `messages` for `interval`.
    fn show(&self, interval: IntervalType, messages: &[String]);
}

/// Dialog that prints to the daemon's terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDialog;

impl Dialog for TerminalDialog {
    fn show(&self, interval: IntervalType, messages: &[String]) {
        println!("[{}]", interval.resource());
        for message in messages {
            println!("  {}", message);
        }
    }
}

/// Dialog that records what it was asked to show.
#[derive(Debug, Default)]
pub struct MockDialog {
    shown: Mutex<Vec<(IntervalType, Vec<String>)>>,
}

impl MockDialog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shown(&self) -> Vec<(IntervalType, Vec<String>)> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Dialog for MockDialog {
    fn show(&self, interval: IntervalType, messages: &[String]) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((interval, messages.to_vec()));
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Lines shown when a countdown completes.
pub fn completion_messages(alert: &Alert) -> Vec<String> {
    vec![
        "Completed".to_string(),
        alert.interval().name().to_string(),
        alert.to_string(),
    ]
}

/// Lines shown when the user tries to switch interval mid-countdown.
pub fn rejection_messages(running: IntervalType) -> Vec<String> {
    vec![
        "To switch you need to toggle".to_string(),
        running.name().to_string(),
    ]
}

// ============================================================================
// AlertHost
// ============================================================================

/// Applies timer events to the reminder scheduler and dialog surface.
pub struct AlertHost {
    scheduler: Arc<dyn NotificationScheduler>,
    dialog: Arc<dyn Dialog>,
}

impl AlertHost {
    /// Creates a host.
    pub fn new(scheduler: Arc<dyn NotificationScheduler>, dialog: Arc<dyn Dialog>) -> Self {
        Self { scheduler, dialog }
    }

    /// Handles a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler fails. The dialog is still shown for
    /// completions even when the reminder cannot be removed.
    pub fn handle(&self, event: &TimerEvent) -> Result<(), SchedulerError> {
        match event {
            TimerEvent::Started { alert } => {
                self.scheduler.schedule(alert.interval().id(), alert.finish())
            }
            TimerEvent::Cancelled { .. } => self.scheduler.remove_all(),
            TimerEvent::Completed { alert } => {
                self.dialog
                    .show(alert.interval(), &completion_messages(alert));
                self.scheduler.remove_all()
            }
        }
    }

    /// Consumes events until the engine side of the channel is dropped.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<TimerEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle(&event) {
                tracing::warn!(event = event.as_str(), "Reminder update failed: {}", e);
            }
        }
        tracing::debug!("Timer event channel closed");
    }
}

// ============================================================================
// Tests
// ============================================================================
