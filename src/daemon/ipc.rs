//! IPC Server for the Pomodoro Timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Integration with TimerEngine for command execution

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use crate::catalog::IntervalCatalog;
use crate::types::{IpcRequest, IpcResponse, ResponseData};

use super::host::rejection_messages;
use super::timer::{TimerEngine, TimerError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// A stale socket file left by a daemon that is gone is removed before
    /// binding. A socket that still accepts connections is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if another daemon is serving `socket_path` or the
    /// socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            ensure_not_served(socket_path)?;
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::info!(path = ?socket_path, "IPC server listening");

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }
        if n == MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Serves connections until accepting fails.
    ///
    /// Each connection carries one request and gets one response. A bad
    /// request is answered with an error response and does not stop the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener stops accepting connections.
    pub async fn serve(&self, handler: Arc<RequestHandler>) -> Result<()> {
        loop {
            let mut stream = self.accept().await?;
            let handler = handler.clone();

            tokio::spawn(async move {
                let response = match Self::receive_request(&mut stream).await {
                    Ok(request) => handler.handle(request).await,
                    Err(e) => {
                        tracing::warn!("Rejected IPC request: {:#}", e);
                        IpcResponse::error(e.to_string())
                    }
                };

                if let Err(e) = Self::send_response(&mut stream, &response).await {
                    tracing::warn!("Failed to answer IPC request: {:#}", e);
                }
            });
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

/// Fails if a live daemon answers on `socket_path`.
fn ensure_not_served(socket_path: &Path) -> Result<()> {
    match std::os::unix::net::UnixStream::connect(socket_path) {
        Ok(_) => anyhow::bail!("Daemon already running at {:?}", socket_path),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            tracing::debug!(path = ?socket_path, "Removing stale socket");
            Ok(())
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to probe existing socket: {:?}", socket_path)),
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to TimerEngine.
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
}

impl RequestHandler {
    /// Creates a new request handler with the given timer engine.
    pub fn new(engine: Arc<Mutex<TimerEngine>>) -> Self {
        Self { engine }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Toggle => self.handle_toggle().await,
            IpcRequest::Select { interval } => self.handle_select(&interval).await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::Items => self.handle_items().await,
        }
    }

    /// Handles the toggle command.
    async fn handle_toggle(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;
        engine.toggle();

        let message = if engine.is_running() {
            "Countdown started"
        } else {
            "Countdown cancelled"
        };
        IpcResponse::success(message, Some(ResponseData::from_snapshot(&engine.snapshot())))
    }

    /// Handles the select command.
    async fn handle_select(&self, id: &str) -> IpcResponse {
        let interval = match IntervalCatalog::lookup(id) {
            Ok(interval) => interval,
            Err(e) => return IpcResponse::error(e.to_string()),
        };

        let mut engine = self.engine.lock().await;
        match engine.select(interval) {
            Ok(()) => IpcResponse::success(
                format!("Selected {}", interval),
                Some(ResponseData::from_snapshot(&engine.snapshot())),
            ),
            Err(TimerError::SelectionRejected { running }) => {
                tracing::info!(
                    requested = interval.id(),
                    running = running.id(),
                    "Selection rejected while running"
                );
                IpcResponse::error(rejection_messages(running).join(": "))
            }
        }
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let engine = self.engine.lock().await;
        IpcResponse::success("", Some(ResponseData::from_snapshot(&engine.snapshot())))
    }

    /// Handles the items command.
    async fn handle_items(&self) -> IpcResponse {
        let engine = self.engine.lock().await;
        IpcResponse::success("", Some(ResponseData::from_items(engine.items())))
    }
}

// ============================================================================
// Tests
// ============================================================================
