//! Encoder port interfaces

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::EncoderSettings;

/// Encoder errors
#[derive(Debug, Clone, Error)]
pub enum EncoderError {
    #[error("Failed to create output file: {0}")]
    FileCreate(String),

    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Failed to finalize recording: {0}")]
    Finalize(String),
}

impl EncoderError {
    /// Whether the failure came from the file system rather than the encoder
    pub fn is_file_system(&self) -> bool {
        matches!(self, Self::FileCreate(_))
    }
}

/// A live encoding resource bound to one output file.
///
/// Implementations keep device and codec work off the async runtime.
#[async_trait]
pub trait Encoder: Send {
    /// Start capturing, resume after a pause, or re-arm capture after the
    /// OS stopped it (e.g. the input device went away). Idempotent.
    async fn record(&mut self) -> Result<(), EncoderError>;

    /// Suspend capture, keeping what was written so far
    async fn pause(&mut self) -> Result<(), EncoderError>;

    /// Stop capture and finalize the file. Idempotent.
    async fn stop(&mut self) -> Result<(), EncoderError>;
}

/// Port for allocating encoders
pub trait EncoderFactory: Send + Sync {
    /// Allocate an encoder writing to `path` with `settings`.
    /// The file is created here and must not exist yet.
    /// The encoder is idle until `record` is called.
    fn open(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn Encoder>, EncoderError>;

    /// Whether this machine can capture audio at all
    fn can_record(&self) -> bool {
        true
    }
}
