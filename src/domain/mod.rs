//! Domain layer - Core business logic
//!
//! Contains value objects, the recording session state machine, and domain
//! errors. This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod session;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{
    AudioFormat, Directory, Duration, EncoderSettings, OutputFile, RecordOptions, RecordingStatus,
};
pub use session::{InvalidStateTransition, RecordingSession};
