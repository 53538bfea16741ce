//! Bridge requests over a Unix domain socket

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, warn};

use super::{runtime_dir, IpcClient, IpcServer};
use crate::bridge::{Request, RequestHandler, Response};

const SOCKET_NAME: &str = "voice-recorder.sock";

/// Location of the daemon socket
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// `voice-recorder.sock` in the runtime directory
    pub fn new() -> Self {
        Self::with_path(runtime_dir().join(SOCKET_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the socket file; a missing file is fine
    pub fn cleanup(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Listens on the socket; the file is removed when the server is dropped
pub struct UnixSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl UnixSocketServer {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }
}

impl Drop for UnixSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[async_trait]
impl IpcServer for UnixSocketServer {
    fn bind(&mut self) -> io::Result<()> {
        // a leftover file from a daemon that crashed; the PID file already
        // ruled out a live one
        self.socket_path.cleanup()?;
        self.listener = Some(UnixListener::bind(self.socket_path.path())?);
        debug!(path = %self.socket_path.path().display(), "Socket bound");
        Ok(())
    }

    fn path(&self) -> String {
        self.socket_path.path().display().to_string()
    }

    async fn run(&self, handler: Arc<dyn RequestHandler>) -> io::Result<()> {
        let Some(listener) = self.listener.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"));
        };

        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Err(e) = serve(stream, handler).await {
                    warn!(error = %e, "Connection ended with an error");
                }
            });
        }
    }

    fn cleanup(&self) {
        if let Err(e) = self.socket_path.cleanup() {
            warn!(error = %e, "Failed to remove socket file");
        }
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: String) -> io::Result<()> {
    let mut bytes = line.into_bytes();
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await
}

/// One response line per request line, until the client hangs up
async fn serve(stream: UnixStream, handler: Arc<dyn RequestHandler>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = handler.handle_line(line).await.to_line();
        debug!(request = line, response = %response, "Answered request");
        write_line(&mut writer, response).await?;
    }
    Ok(())
}

/// Sends one request per connection
pub struct UnixSocketClient {
    socket_path: SocketPath,
}

impl UnixSocketClient {
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }
}

#[async_trait]
impl IpcClient for UnixSocketClient {
    /// Something accepts connections on the socket
    fn is_daemon_running(&self) -> bool {
        std::os::unix::net::UnixStream::connect(self.socket_path.path()).is_ok()
    }

    async fn send(&self, request: &Request) -> io::Result<Response> {
        let (reader, mut writer) = UnixStream::connect(self.socket_path.path())
            .await?
            .into_split();
        write_line(&mut writer, request.to_line()).await?;

        let Some(line) = BufReader::new(reader).lines().next_line().await? else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Daemon closed the connection without answering",
            ));
        };
        Response::parse(&line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
