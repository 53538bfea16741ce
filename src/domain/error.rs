//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected <number><unit> segments with units h, m, s or ms (e.g., 30s, 2m30s, 500ms)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an unknown directory category is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid directory: \"{input}\". Valid directories are: CACHE, LIBRARY, DOCUMENTS")]
pub struct InvalidDirectoryError {
    pub input: String,
}

/// Error when an unknown output format is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid format: \"{input}\". Valid formats are: aac, flac")]
pub struct InvalidFormatError {
    pub input: String,
}

/// Error when an unknown recording status is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid recording status: \"{input}\". Expected NONE, RECORDING or PAUSED")]
pub struct InvalidStatusError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_error_lists_choices() {
        let err = InvalidDirectoryError {
            input: "tmp".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"tmp\""));
        assert!(msg.contains("CACHE, LIBRARY, DOCUMENTS"));
    }

    #[test]
    fn config_validation_error_names_key() {
        let err = ConfigError::ValidationError {
            key: "format".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid config value for 'format': bad");
    }
}
