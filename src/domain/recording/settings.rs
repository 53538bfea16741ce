//! Encoder settings value objects

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidFormatError;

/// Container/codec the encoder writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    /// AAC in ADTS framing
    #[default]
    Aac,
    /// Lossless FLAC
    Flac,
}

impl AudioFormat {
    /// File extension without the dot
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Flac => "flac",
        }
    }

    /// MIME type reported to callers
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = InvalidFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aac" => Ok(Self::Aac),
            "flac" => Ok(Self::Flac),
            _ => Err(InvalidFormatError {
                input: s.to_string(),
            }),
        }
    }
}

/// Encoder quality hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// Fixed settings handed to the encoder when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u16,
    pub quality: EncoderQuality,
}

impl EncoderSettings {
    /// Voice recording sample rate
    pub const SAMPLE_RATE: u32 = 44_100;

    /// AAC, 44.1kHz, mono, high quality
    pub const fn voice() -> Self {
        Self {
            format: AudioFormat::Aac,
            sample_rate: Self::SAMPLE_RATE,
            channels: 1,
            quality: EncoderQuality::High,
        }
    }

    /// Same settings with a different output format
    pub const fn with_format(self, format: AudioFormat) -> Self {
        Self { format, ..self }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::voice()
    }
}
