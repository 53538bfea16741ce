//! Process signals that end a recording or the daemon

use std::io;
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, watch};
use tracing::info;

/// Ctrl+C for one-shot mode: the first SIGINT asks the recording to end
pub struct ShutdownSignal {
    requested: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (requested, _) = watch::channel(false);
        Self {
            requested: Arc::new(requested),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.requested.borrow()
    }

    /// Ask for shutdown as if SIGINT had arrived
    pub fn request(&self) {
        self.requested.send_replace(true);
    }

    /// Start listening for SIGINT
    pub async fn setup(&self) -> io::Result<()> {
        let mut sigint = signal(SignalKind::interrupt())?;
        let requested = Arc::clone(&self.requested);
        tokio::spawn(async move {
            if sigint.recv().await.is_some() {
                info!("SIGINT received");
                requested.send_replace(true);
            }
        });
        Ok(())
    }

    /// Resolve once shutdown was requested
    pub async fn wait(&self) {
        let mut requested = self.requested.subscribe();
        // the sender lives in `self`, so this only returns once flagged
        let _ = requested.wait_for(|flag| *flag).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Signals that end the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    Interrupt,
    Terminate,
}

impl DaemonSignal {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// SIGINT and SIGTERM as [`DaemonSignal`]s on one channel
pub struct DaemonSignalHandler {
    receiver: mpsc::Receiver<DaemonSignal>,
}

impl DaemonSignalHandler {
    /// Install both handlers. Must run inside the tokio runtime.
    pub fn new() -> io::Result<Self> {
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let (tx, receiver) = mpsc::channel(4);

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    Some(()) = sigint.recv() => DaemonSignal::Interrupt,
                    Some(()) = sigterm.recv() => DaemonSignal::Terminate,
                    else => break,
                };
                info!(signal = received.name(), "Signal received");
                if tx.send(received).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self { receiver })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<DaemonSignal> {
        self.receiver.recv().await
    }
}
