//! Display utilities for the Pomodoro Timer CLI.
//!
//! This module provides formatted output for:
//! - Toggle and select results
//! - Status display
//! - The interval list
//! - Error messages

use crate::types::{IntervalInfo, IpcResponse, ResponseData, TOGGLE_RESOURCE};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a toggle.
    pub fn show_toggle_success(response: &IpcResponse) {
        println!("[{}] {}", TOGGLE_RESOURCE, response.message);

        if let Some(data) = &response.data {
            if let Some(line) = Self::countdown_line(data) {
                println!("  {}", line);
            }
        }
    }

    /// Shows the result of a select.
    pub fn show_select_success(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(data) = &response.data {
            if let Some(line) = Self::countdown_line(data) {
                println!("  {}", line);
            }
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("Pomodoro Timer Status");
        println!("─────────────────────────────");

        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("The timer is not running"),
        }
    }

    /// Shows the interval catalog.
    pub fn show_items(response: &IpcResponse) {
        let items = response
            .data
            .as_ref()
            .and_then(|data| data.items.as_deref())
            .unwrap_or_default();

        if items.is_empty() {
            println!("No intervals available");
            return;
        }

        for item in items {
            println!("{}", Self::item_line(item));
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Formats `Name  mm:ss` for the active selection.
    fn countdown_line(data: &ResponseData) -> Option<String> {
        match (&data.name, &data.display) {
            (Some(name), Some(display)) => Some(format!("{}  {}", name, display)),
            (None, Some(display)) => Some(display.clone()),
            _ => None,
        }
    }

    /// Formats the body of the status output.
    fn status_lines(data: &ResponseData) -> Vec<String> {
        let mut lines = Vec::new();

        let state = data.state.as_deref().unwrap_or("unknown");
        let state_display = match state {
            "running" => "Running",
            "idle" => "Idle",
            _ => state,
        };
        lines.push(format!("State: {}", state_display));

        if let Some(name) = &data.name {
            lines.push(format!("Interval: {}", name));
        }
        if let Some(display) = &data.display {
            lines.push(format!("Remaining: {}", display));
        }
        if let Some(alert) = &data.alert {
            lines.push(alert.to_string());
        }

        lines
    }

    /// Formats one catalog entry.
    fn item_line(item: &IntervalInfo) -> String {
        format!(
            "{:<12} {:<12} {:>2} min  [{}]",
            item.id, item.name, item.minutes, item.resource
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
