//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the recording controller
//! and the platform adapters.

pub mod audio_session;
pub mod background;
pub mod config;
pub mod encoder;
pub mod events;
pub mod lifecycle;
pub mod notifier;
pub mod storage;

// Re-export common types
pub use audio_session::{
    AudioCategory, AudioConfiguration, AudioSession, AudioSessionError, AudioSessionEvent,
    InvalidRouteChangeReason, RecordPermission, RouteChangeReason,
};
pub use background::{BackgroundExecution, ExpiryHandler, GrantId};
pub use config::ConfigStore;
pub use encoder::{Encoder, EncoderError, EncoderFactory};
pub use events::{EventHub, Subscription};
pub use lifecycle::{AppLifecycle, LifecycleEvent};
pub use notifier::{NotificationError, Notifier, RecordingNotice};
pub use storage::DirectoryResolver;
