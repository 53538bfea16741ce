//! Recording status value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidStatusError;

/// Lifecycle status of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordingStatus {
    #[default]
    None,
    Recording,
    Paused,
}

impl RecordingStatus {
    /// Get the wire representation used by the bridge
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Recording => "RECORDING",
            Self::Paused => "PAUSED",
        }
    }

    /// Whether a session (and its encoder) is alive
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordingStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "RECORDING" => Ok(Self::Recording),
            "PAUSED" => Ok(Self::Paused),
            _ => Err(InvalidStatusError {
                input: s.to_string(),
            }),
        }
    }
}
