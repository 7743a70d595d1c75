//! Core data types for the Pomodoro Timer.
//!
//! This module defines the data structures used for:
//! - The fixed interval types and the alerts they produce
//! - Pending notifications handed over by the host at startup
//! - Daemon configuration with validation
//! - IPC request/response serialization

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// IntervalType
// ============================================================================

/// Icon resource key of the start/cancel control.
pub const TOGGLE_RESOURCE: &str = "TimerClock";

/// One of the three fixed countdown categories.
///
/// The variant name doubles as the stable identity string, which is what
/// scheduled notifications reference across runs. Never rename a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalType {
    /// Focused work session
    TaskTimer,
    /// Short break between work sessions
    ShortBreak,
    /// Long break
    LongBreak,
}

impl IntervalType {
    /// Returns the stable identity string.
    pub fn id(&self) -> &'static str {
        match self {
            IntervalType::TaskTimer => "TaskTimer",
            IntervalType::ShortBreak => "ShortBreak",
            IntervalType::LongBreak => "LongBreak",
        }
    }

    /// Returns the human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            IntervalType::TaskTimer => "Task Timer",
            IntervalType::ShortBreak => "Short Break",
            IntervalType::LongBreak => "Long Break",
        }
    }

    /// Returns the icon resource key.
    pub fn resource(&self) -> &'static str {
        match self {
            IntervalType::TaskTimer => "Tomato",
            IntervalType::ShortBreak => "HotBeverage",
            IntervalType::LongBreak => "GreenApple",
        }
    }

    /// Returns the countdown length in minutes.
    pub fn minutes(&self) -> u32 {
        match self {
            IntervalType::TaskTimer => 25,
            IntervalType::ShortBreak => 5,
            IntervalType::LongBreak => 20,
        }
    }

    /// Returns the countdown length as a duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Alert
// ============================================================================

/// An in-flight countdown: when it started, when it finishes, and for which interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    start: DateTime<Utc>,
    finish: DateTime<Utc>,
    interval: IntervalType,
}

impl Alert {
    /// Creates an alert starting at `start` and running for the full interval.
    pub fn starting_at(start: DateTime<Utc>, interval: IntervalType) -> Self {
        Self {
            start,
            finish: start + interval.duration(),
            interval,
        }
    }

    /// Creates an alert that finishes at `finish`, back-dating its start.
    pub fn finishing_at(finish: DateTime<Utc>, interval: IntervalType) -> Self {
        Self {
            start: finish - interval.duration(),
            finish,
            interval,
        }
    }

    /// Returns the start timestamp.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the finish timestamp.
    pub fn finish(&self) -> DateTime<Utc> {
        self.finish
    }

    /// Returns the interval this alert belongs to.
    pub fn interval(&self) -> IntervalType {
        self.interval
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Started {} Finished {}",
            self.start.format("%H:%M"),
            self.finish.format("%H:%M")
        )
    }
}

// ============================================================================
// PendingNotification
// ============================================================================

/// A reminder scheduled with the host's notification service, possibly
/// surviving a process restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    /// Identity string of the interval the reminder belongs to
    pub id: String,
    /// When the countdown completes
    pub completed: DateTime<Utc>,
}

impl PendingNotification {
    /// Creates a new pending notification.
    pub fn new(id: impl Into<String>, completed: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            completed,
        }
    }
}

// ============================================================================
// CurrentInterval / TimerSnapshot
// ============================================================================

/// The active selection together with its countdown label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentInterval {
    /// Currently selected interval
    pub interval: IntervalType,
    /// Countdown label in `mm:ss`
    pub display: String,
}

/// Point-in-time view of the timer engine, used for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Active selection and label
    pub current: CurrentInterval,
    /// Running alert, if a countdown is active
    pub alert: Option<Alert>,
}

impl TimerSnapshot {
    /// Returns true if a countdown is active.
    pub fn is_running(&self) -> bool {
        self.alert.is_some()
    }
}

// ============================================================================
// DaemonConfig
// ============================================================================

/// Directory under the home directory holding the socket and schedule file.
const DATA_DIR: &str = ".pomodoro";

/// Configuration for the daemon process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Unix socket the IPC server listens on
    pub socket_path: PathBuf,
    /// File holding the scheduled reminder
    pub schedule_path: PathBuf,
    /// Tick cadence in milliseconds (10-1000)
    pub tick_interval_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let dir = data_dir();
        Self {
            socket_path: dir.join("pomodoro.sock"),
            schedule_path: dir.join("scheduled.json"),
            tick_interval_ms: crate::daemon::ticker::DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl DaemonConfig {
    /// Overrides the socket path.
    pub fn with_socket_path(mut self, path: PathBuf) -> Self {
        self.socket_path = path;
        self
    }

    /// Overrides the schedule file path.
    pub fn with_schedule_path(mut self, path: PathBuf) -> Self {
        self.schedule_path = path;
        self
    }

    /// Overrides the tick cadence.
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms < 10 || self.tick_interval_ms > 1000 {
            return Err("Tick interval must be between 10 and 1000 ms".to_string());
        }
        if self.socket_path.as_os_str().is_empty() {
            return Err("Socket path must not be empty".to_string());
        }
        if self.schedule_path.as_os_str().is_empty() {
            return Err("Schedule file path must not be empty".to_string());
        }
        Ok(())
    }
}

/// Returns `~/.pomodoro`, or `./.pomodoro` when no home directory is known.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR)
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start or cancel the countdown
    Toggle,
    /// Change the active interval
    Select {
        /// Identity string of the interval
        interval: String,
    },
    /// Query the current status
    Status,
    /// List the interval catalog
    Items,
}

/// Catalog entry as reported over IPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalInfo {
    /// Identity string
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Duration in minutes
    pub minutes: u32,
    /// Icon resource key
    pub resource: String,
}

impl From<IntervalType> for IntervalInfo {
    fn from(interval: IntervalType) -> Self {
        Self {
            id: interval.id().to_string(),
            name: interval.name().to_string(),
            minutes: interval.minutes(),
            resource: interval.resource().to_string(),
        }
    }
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// "running" or "idle"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Identity of the active selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// Name of the active selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Countdown label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Running alert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    /// Catalog listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<IntervalInfo>>,
}

impl ResponseData {
    /// Creates response data from a timer snapshot.
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        let state = if snapshot.is_running() { "running" } else { "idle" };
        Self {
            state: Some(state.to_string()),
            interval: Some(snapshot.current.interval.id().to_string()),
            name: Some(snapshot.current.interval.name().to_string()),
            display: Some(snapshot.current.display.clone()),
            alert: snapshot.alert.clone(),
            items: None,
        }
    }

    /// Creates response data listing the given intervals.
    pub fn from_items(items: &[IntervalType]) -> Self {
        Self {
            items: Some(items.iter().copied().map(IntervalInfo::from).collect()),
            ..Self::default()
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if this is an error response.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================
