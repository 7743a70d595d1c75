//! Host-side reminder scheduling.
//!
//! The timer engine never talks to the scheduler. The daemon host schedules
//! a reminder when a countdown starts, removes it when the countdown is
//! cancelled or delivered, and reads it back at startup so a countdown that
//! was in flight when the process exited can be resumed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ events ┌──────────────┐     ┌──────────────────────────┐
//! │ TimerEngine  │───────▶│  AlertHost   │────▶│  NotificationScheduler   │
//! └──────────────┘        └──────────────┘     │  - FileNotificationSch.  │
//!        ▲                                     │  - MockNotificationSch.  │
//!        │ seed (startup)                      └────────────┬─────────────┘
//!        └──────────────────────────────────────────────────┘
//! ```

mod error;
mod file;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

pub use self::error::SchedulerError;
pub use self::file::FileNotificationScheduler;

use crate::types::PendingNotification;

/// A reminder service that outlives the process.
///
/// Holds at most one reminder; scheduling replaces any previous one.
pub trait NotificationScheduler: Send + Sync {
    /// Schedules a reminder for interval `id` firing at `fire_at`.
    fn schedule(&self, id: &str, fire_at: DateTime<Utc>) -> Result<(), SchedulerError>;

    /// Removes every scheduled reminder.
    fn remove_all(&self) -> Result<(), SchedulerError>;

    /// Returns the scheduled reminder, if any.
    fn scheduled(&self) -> Result<Option<PendingNotification>, SchedulerError>;
}

/// In-memory scheduler for testing.
#[derive(Debug, Default)]
pub struct MockNotificationScheduler {
    pending: Mutex<Option<PendingNotification>>,
    schedule_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockNotificationScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that already holds `pending`.
    #[must_use]
    pub fn with_pending(pending: PendingNotification) -> Self {
        let mock = Self::new();
        *mock.lock() = Some(pending);
        mock
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn remove_count(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingNotification> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingNotification>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(&self) -> Result<(), SchedulerError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SchedulerError::Unavailable("Mock failure".to_string()));
        }
        Ok(())
    }
}

impl NotificationScheduler for MockNotificationScheduler {
    fn schedule(&self, id: &str, fire_at: DateTime<Utc>) -> Result<(), SchedulerError> {
        self.check_failure()?;
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        *self.lock() = Some(PendingNotification::new(id, fire_at));
        Ok(())
    }

    fn remove_all(&self) -> Result<(), SchedulerError> {
        self.check_failure()?;
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        *self.lock() = None;
        Ok(())
    }

    fn scheduled(&self) -> Result<Option<PendingNotification>, SchedulerError> {
        self.check_failure()?;
        Ok(self.pending())
    }
}
