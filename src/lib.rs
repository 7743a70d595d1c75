//! Pomodoro Timer Library
//!
//! This library provides the core functionality for the Pomodoro Timer CLI.
//! It includes:
//! - The fixed catalog of work and break intervals
//! - Timer engine with a single idle/running countdown
//! - Reminder scheduling that survives a daemon restart
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod catalog;
pub mod cli;
pub mod daemon;
pub mod scheduler;
pub mod types;

// Re-export commonly used types for convenience
pub use catalog::{CatalogError, IntervalCatalog};
pub use daemon::{run_daemon, TimerEngine, TimerError, TimerEvent};
pub use scheduler::{
    FileNotificationScheduler, MockNotificationScheduler, NotificationScheduler, SchedulerError,
};
pub use types::{
    Alert, CurrentInterval, DaemonConfig, IntervalType, IpcRequest, IpcResponse,
    PendingNotification, ResponseData, TimerSnapshot,
};
