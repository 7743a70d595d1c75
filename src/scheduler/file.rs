//! JSON-file backed reminder store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{NotificationScheduler, SchedulerError};
use crate::types::PendingNotification;

/// Keeps the single scheduled reminder in a JSON file.
///
/// A missing file means nothing is scheduled.
#[derive(Debug, Clone)]
pub struct FileNotificationScheduler {
    path: PathBuf,
}

impl FileNotificationScheduler {
    /// Creates a scheduler backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NotificationScheduler for FileNotificationScheduler {
    fn schedule(&self, id: &str, fire_at: DateTime<Utc>) -> Result<(), SchedulerError> {
        let record = PendingNotification::new(id, fire_at);
        let json = serde_json::to_vec_pretty(&record).map_err(SchedulerError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SchedulerError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, json).map_err(|source| SchedulerError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(id, fire_at = %fire_at, path = ?self.path, "Reminder scheduled");
        Ok(())
    }

    fn remove_all(&self) -> Result<(), SchedulerError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "Reminder removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SchedulerError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn scheduled(&self) -> Result<Option<PendingNotification>, SchedulerError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SchedulerError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record = serde_json::from_slice(&bytes).map_err(SchedulerError::Corrupt)?;
        Ok(Some(record))
    }
}
