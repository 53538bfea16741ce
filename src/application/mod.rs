//! Application layer - Use cases and port interfaces
//!
//! Contains the recording controller and the trait definitions
//! for the platform services it drives.

pub mod ports;
pub mod recorder;

// Re-export use cases
pub use recorder::{
    ControllerConfig, RecorderError, RecordingController, RecordingResult, BACKGROUND_TASK_NAME,
};
