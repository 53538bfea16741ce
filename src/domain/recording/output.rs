//! Output file naming

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::settings::AudioFormat;

/// Prefix shared by every recording file name
pub const FILE_PREFIX: &str = "recording-";

/// The file a session writes to, fixed at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    path: PathBuf,
    relative: String,
    format: AudioFormat,
}

impl OutputFile {
    /// Build `<directory>/recording-<timestamp_ms>.<ext>`.
    ///
    /// `directory` is the fully resolved target (base + sub-directory);
    /// `sub_directory` is only used for the relative path reported back.
    pub fn new(
        directory: &Path,
        sub_directory: Option<&str>,
        timestamp_ms: u64,
        format: AudioFormat,
    ) -> Self {
        let name = file_name(timestamp_ms, format);
        let relative = match sub_directory {
            Some(sub) => format!("{}/{}", sub, name),
            None => name.clone(),
        };
        Self {
            path: directory.join(name),
            relative,
            format,
        }
    }

    /// Absolute path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the base directory (`sub/recording-<ms>.ext`)
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Output format
    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

/// `recording-<timestamp_ms>.<ext>`
pub fn file_name(timestamp_ms: u64, format: AudioFormat) -> String {
    format!("{}{}.{}", FILE_PREFIX, timestamp_ms, format.extension())
}

/// Extract the millisecond timestamp from a recording file name
pub fn parse_timestamp(file_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix(FILE_PREFIX)?;
    let (digits, extension) = rest.split_once('.')?;
    if extension.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Current wall-clock time in epoch milliseconds
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
