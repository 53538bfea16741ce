//! PID file management for daemon mode

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::ipc::runtime_dir;

const PID_FILE_NAME: &str = "voice-recorder.pid";

/// PID file for daemon mode.
///
/// Only a `PidFile` that acquired the file removes it again, on
/// [`PidFile::release`] or drop.
pub struct PidFile {
    path: PathBuf,
    owned: AtomicBool,
}

impl PidFile {
    /// `voice-recorder.pid` next to the daemon socket
    pub fn new() -> Self {
        Self::with_path(runtime_dir().join(PID_FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID of a live daemon recorded in the file. A file naming a dead
    /// process is removed.
    pub fn is_running(&self) -> Option<u32> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let pid: u32 = contents.trim().parse().ok()?;

        // no signal: only checks that the process exists
        match kill(Pid::from_raw(pid as i32), None::<Signal>) {
            Ok(()) | Err(Errno::EPERM) => Some(pid),
            Err(Errno::ESRCH) => {
                debug!(pid, path = %self.path.display(), "Removing stale PID file");
                let _ = fs::remove_file(&self.path);
                None
            }
            Err(_) => None,
        }
    }

    /// Write our PID; fails if a live daemon already holds the file
    pub fn acquire(&self) -> Result<(), PidFileError> {
        if let Some(pid) = self.is_running() {
            return Err(PidFileError::AlreadyRunning(pid));
        }
        if self.path.exists() {
            // unreadable or garbage contents
            fs::remove_file(&self.path).map_err(PidFileError::Remove)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    PidFileError::AlreadyRunning(self.is_running().unwrap_or(0))
                }
                _ => PidFileError::Write(e),
            })?;
        write!(file, "{}", process::id()).map_err(PidFileError::Write)?;

        self.owned.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Remove the file if this instance acquired it
    pub fn release(&self) -> Result<(), PidFileError> {
        if !self.owned.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PidFileError::Remove(e)),
        }
    }
}

impl Default for PidFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "PID file left behind");
        }
    }
}

/// PID file errors
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another daemon is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Failed to write PID file")]
    Write(#[source] io::Error),

    #[error("Failed to remove PID file")]
    Remove(#[source] io::Error),
}
