//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces: the host-driven
//! audio session and lifecycle, timer-backed background grants, cpal capture,
//! desktop notifications and the TOML config store.

pub mod audio;
pub mod config;
pub mod host;
pub mod notification;
pub mod recording;

// Re-export adapters
pub use audio::HostAudioSession;
pub use config::XdgConfigStore;
pub use host::{HostBackgroundExecution, HostLifecycle, PlatformDirectories};
pub use notification::{create_notifier, NotifyRustNotifier};
pub use recording::{CpalEncoder, CpalEncoderFactory};
