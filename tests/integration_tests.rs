//! Integration tests for Daemon-CLI IPC communication.
//!
//! These tests drive a real `IpcServer` + `RequestHandler` through the
//! `IpcClient` over a Unix socket:
//! - Toggle starts and cancels the countdown
//! - Select changes the interval while idle and is refused while running
//! - Status and items report engine state
//! - Connection errors surface to the caller

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};

use pomodoro_app::cli::client::IpcClient;
use pomodoro_app::daemon::ipc::{IpcServer, RequestHandler};
use pomodoro_app::daemon::timer::{TimerEngine, TimerEvent};
use pomodoro_app::types::IntervalType;

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a temporary socket path for testing.
fn create_temp_socket_path() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("integration_test.sock");
    // Keep the directory so it's not deleted
    std::mem::forget(dir);
    path
}

/// Creates a TimerEngine with event channel.
fn create_engine() -> (Arc<Mutex<TimerEngine>>, mpsc::UnboundedReceiver<TimerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = TimerEngine::new(None, tx);
    (Arc::new(Mutex::new(engine)), rx)
}

/// Starts a server on `socket_path` and serves in the background.
fn spawn_server(
    socket_path: &Path,
    engine: Arc<Mutex<TimerEngine>>,
) -> tokio::task::JoinHandle<()> {
    let server = IpcServer::new(socket_path).unwrap();
    let handler = Arc::new(RequestHandler::new(engine));
    tokio::spawn(async move {
        let _ = server.serve(handler).await;
    })
}

// ============================================================================
// Toggle
// ============================================================================

#[tokio::test]
async fn toggle_starts_and_cancels_countdown() {
    let socket_path = create_temp_socket_path();
    let (engine, mut rx) = create_engine();
    let server = spawn_server(&socket_path, engine.clone());
    let client = IpcClient::with_socket_path(socket_path);

    let response = client.toggle().await.unwrap();
    assert_eq!(response.message, "Countdown started");
    let data = response.data.unwrap();
    assert_eq!(data.state.as_deref(), Some("running"));
    assert_eq!(data.interval.as_deref(), Some("TaskTimer"));
    let alert = data.alert.unwrap();
    assert_eq!(alert.finish() - alert.start(), chrono::Duration::minutes(25));

    let started = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
    assert!(matches!(started, Some(TimerEvent::Started { .. })));

    let response = client.toggle().await.unwrap();
    assert_eq!(response.message, "Countdown cancelled");
    let data = response.data.unwrap();
    assert_eq!(data.state.as_deref(), Some("idle"));
    assert_eq!(data.display.as_deref(), Some("25:00"));
    assert!(data.alert.is_none());

    match timeout(Duration::from_secs(1), rx.recv()).await.unwrap() {
        Some(TimerEvent::Cancelled { alert: cancelled }) => assert_eq!(cancelled, alert),
        other => panic!("Expected Cancelled event, got {:?}", other),
    }

    assert!(!engine.lock().await.is_running());
    server.abort();
}

// ============================================================================
// Select
// ============================================================================

#[tokio::test]
async fn select_while_idle_changes_display() {
    let socket_path = create_temp_socket_path();
    let (engine, mut rx) = create_engine();
    let server = spawn_server(&socket_path, engine.clone());
    let client = IpcClient::with_socket_path(socket_path);

    let response = client.select(IntervalType::ShortBreak).await.unwrap();
    assert_eq!(response.message, "Selected Short Break");
    let data = response.data.unwrap();
    assert_eq!(data.state.as_deref(), Some("idle"));
    assert_eq!(data.display.as_deref(), Some("05:00"));

    // Selecting emits no lifecycle event.
    assert!(rx.try_recv().is_err());
    assert_eq!(engine.lock().await.selection(), IntervalType::ShortBreak);
    server.abort();
}

#[tokio::test]
async fn select_while_running_is_refused() {
    let socket_path = create_temp_socket_path();
    let (engine, _rx) = create_engine();
    let server = spawn_server(&socket_path, engine.clone());
    let client = IpcClient::with_socket_path(socket_path);

    client.toggle().await.unwrap();

    let error = client
        .select(IntervalType::LongBreak)
        .await
        .unwrap_err()
        .to_string();
    assert_eq!(error, "To switch you need to toggle: Task Timer");

    let engine = engine.lock().await;
    assert!(engine.is_running());
    assert_eq!(engine.selection(), IntervalType::TaskTimer);
    drop(engine);
    server.abort();
}

// ============================================================================
// Status / Items
// ============================================================================

#[tokio::test]
async fn status_reports_idle_default() {
    let socket_path = create_temp_socket_path();
    let (engine, _rx) = create_engine();
    let server = spawn_server(&socket_path, engine);
    let client = IpcClient::with_socket_path(socket_path);

    let data = client.status().await.unwrap().data.unwrap();
    assert_eq!(data.state.as_deref(), Some("idle"));
    assert_eq!(data.name.as_deref(), Some("Task Timer"));
    assert_eq!(data.display.as_deref(), Some("25:00"));
    server.abort();
}

#[tokio::test]
async fn items_lists_catalog_in_order() {
    let socket_path = create_temp_socket_path();
    let (engine, _rx) = create_engine();
    let server = spawn_server(&socket_path, engine);
    let client = IpcClient::with_socket_path(socket_path);

    let items = client.items().await.unwrap().data.unwrap().items.unwrap();
    let summary: Vec<(&str, u32)> = items
        .iter()
        .map(|item| (item.id.as_str(), item.minutes))
        .collect();
    assert_eq!(
        summary,
        vec![("TaskTimer", 25), ("ShortBreak", 5), ("LongBreak", 20)]
    );
    server.abort();
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn concurrent_status_requests() {
    let socket_path = create_temp_socket_path();
    let (engine, _rx) = create_engine();
    let server = spawn_server(&socket_path, engine);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = IpcClient::with_socket_path(socket_path.clone());
        handles.push(tokio::spawn(async move { client.status().await }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status, "success");
    }
    server.abort();
}

// ============================================================================
// Connection Errors
// ============================================================================

#[tokio::test]
async fn connection_error_when_daemon_missing() {
    let socket_path = create_temp_socket_path();
    let client = IpcClient::with_socket_path(socket_path);

    let result = timeout(Duration::from_secs(10), client.status()).await.unwrap();
    let message = format!("{:#}", result.unwrap_err());
    assert!(
        message.contains("Cannot connect to the daemon"),
        "Unexpected error: {}",
        message
    );
}
