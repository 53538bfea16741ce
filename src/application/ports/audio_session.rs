//! Audio hardware session port

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::events::Subscription;

/// Audio session errors
#[derive(Debug, Clone, Error)]
pub enum AudioSessionError {
    #[error("Record access denied: {0}")]
    AccessDenied(String),

    #[error("Failed to change audio category: {0}")]
    CategoryFailed(String),

    #[error("Failed to change audio session activation: {0}")]
    ActivationFailed(String),
}

/// Shared audio configuration categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioCategory {
    Ambient,
    #[default]
    SoloAmbient,
    Playback,
    /// Exclusive microphone capture
    Record,
    PlayAndRecord,
    MultiRoute,
}

impl AudioCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::SoloAmbient => "solo-ambient",
            Self::Playback => "playback",
            Self::Record => "record",
            Self::PlayAndRecord => "play-and-record",
            Self::MultiRoute => "multi-route",
        }
    }
}

impl fmt::Display for AudioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the shared audio configuration taken before a session
/// claims exclusive access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioConfiguration {
    pub category: AudioCategory,
}

/// Why the OS changed the audio route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteChangeReason {
    Unknown,
    NewDeviceAvailable,
    /// The device in use went away (e.g. headphones unplugged)
    OldDeviceUnavailable,
    CategoryChange,
    Override,
    WakeFromSleep,
    NoSuitableRouteForCategory,
    RouteConfigurationChange,
}

impl RouteChangeReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NewDeviceAvailable => "new-device-available",
            Self::OldDeviceUnavailable => "old-device-unavailable",
            Self::CategoryChange => "category-change",
            Self::Override => "override",
            Self::WakeFromSleep => "wake-from-sleep",
            Self::NoSuitableRouteForCategory => "no-suitable-route-for-category",
            Self::RouteConfigurationChange => "route-configuration-change",
        }
    }
}

impl fmt::Display for RouteChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an unknown route change reason is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid route change reason: \"{input}\"")]
pub struct InvalidRouteChangeReason {
    pub input: String,
}

impl FromStr for RouteChangeReason {
    type Err = InvalidRouteChangeReason;

    /// Accepts kebab-case, snake_case and camelCase spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        let reason = match key.as_str() {
            "unknown" => Self::Unknown,
            "newdeviceavailable" => Self::NewDeviceAvailable,
            "olddeviceunavailable" => Self::OldDeviceUnavailable,
            "categorychange" => Self::CategoryChange,
            "override" => Self::Override,
            "wakefromsleep" => Self::WakeFromSleep,
            "nosuitablerouteforcategory" => Self::NoSuitableRouteForCategory,
            "routeconfigurationchange" => Self::RouteConfigurationChange,
            _ => {
                return Err(InvalidRouteChangeReason {
                    input: s.to_string(),
                })
            }
        };
        Ok(reason)
    }
}

/// Whether the user allows microphone capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordPermission {
    #[default]
    Granted,
    Denied,
    /// Never asked
    Undetermined,
}

impl RecordPermission {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for RecordPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notifications raised by the audio session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSessionEvent {
    InterruptionBegan,
    InterruptionEnded { should_resume: bool },
    RouteChanged(RouteChangeReason),
}

/// Port for the platform audio session.
///
/// Calls are synchronous OS requests; none of them block indefinitely.
pub trait AudioSession: Send + Sync {
    /// Snapshot of the current shared configuration
    fn current_configuration(&self) -> AudioConfiguration;

    /// Switch the shared configuration to a category
    fn set_category(&self, category: AudioCategory) -> Result<(), AudioSessionError>;

    /// Activate or deactivate the session
    fn set_active(&self, active: bool) -> Result<(), AudioSessionError>;

    /// Put a previously captured configuration back
    fn restore(&self, configuration: &AudioConfiguration) -> Result<(), AudioSessionError> {
        self.set_category(configuration.category)
    }

    /// Subscribe to interruption and route-change notifications
    fn subscribe(&self) -> Subscription<AudioSessionEvent>;

    /// Current microphone permission
    fn record_permission(&self) -> RecordPermission {
        RecordPermission::Granted
    }

    /// Ask for microphone permission if it was never decided.
    /// Returns whether capture is allowed afterwards.
    fn request_record_permission(&self) -> bool {
        self.record_permission() == RecordPermission::Granted
    }

    /// Another client (a call, another recorder) holds the input
    fn is_input_occupied(&self) -> bool {
        false
    }
}
