//! IPC (Inter-Process Communication) for daemon control
//!
//! The daemon answers bridge requests, one JSON object per line, over a
//! Unix domain socket.

#[cfg(unix)]
mod unix_socket;

#[cfg(unix)]
pub use unix_socket::{SocketPath, UnixSocketClient, UnixSocketServer};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::bridge::{Request, RequestHandler, Response};

/// Where the daemon keeps its socket and PID file: `$XDG_RUNTIME_DIR`,
/// else the system temp directory
pub(crate) fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Trait for IPC servers that answer bridge requests
#[async_trait::async_trait]
pub trait IpcServer: Send + Sync {
    /// Bind to the IPC endpoint
    fn bind(&mut self) -> io::Result<()>;

    /// Get the path/name of the IPC endpoint
    fn path(&self) -> String;

    /// Accept connections until the task is dropped.
    ///
    /// Every line a client sends is parsed as a request and answered by
    /// `handler` with one response line.
    async fn run(&self, handler: Arc<dyn RequestHandler>) -> io::Result<()>;

    /// Cleanup IPC resources
    fn cleanup(&self);
}

/// Trait for IPC clients that send requests to the daemon
#[async_trait::async_trait]
pub trait IpcClient: Send + Sync {
    /// Check if daemon appears to be running (endpoint exists)
    fn is_daemon_running(&self) -> bool;

    /// Send one request and wait for its response
    async fn send(&self, request: &Request) -> io::Result<Response>;
}

/// Create the IPC server for the current platform
#[cfg(unix)]
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(UnixSocketServer::new(SocketPath::new()))
}

/// Create the IPC client for the current platform
#[cfg(unix)]
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(UnixSocketClient::new(SocketPath::new()))
}
