//! Error types for the notification scheduler.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Notification scheduler error type.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Failed to read the schedule file.
    #[error("Failed to read schedule file {path:?}: {source}")]
    Read {
        /// Schedule file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to write the schedule file.
    #[error("Failed to write schedule file {path:?}: {source}")]
    Write {
        /// Schedule file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to remove the schedule file.
    #[error("Failed to remove schedule file {path:?}: {source}")]
    Remove {
        /// Schedule file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The schedule file does not hold a valid reminder.
    #[error("Schedule file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// Failed to serialize a reminder.
    #[error("Failed to serialize reminder: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Injected failure from the mock scheduler.
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
}

impl SchedulerError {
    /// Returns true if the stored state is unusable and should be discarded.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}
