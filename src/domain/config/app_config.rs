//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::{AudioFormat, Directory, Duration, RecordOptions};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory category: CACHE, LIBRARY or DOCUMENTS
    pub directory: Option<String>,
    /// Sub-directory under the base directory
    pub sub_directory: Option<String>,
    /// Output format written by the capture encoder
    pub format: Option<String>,
    /// Show a desktop notification while recording
    pub notify: Option<bool>,
    /// Extended-execution budget while backgrounded
    pub background_budget: Option<String>,
    /// One-shot recording length
    pub duration: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            directory: Some(Directory::Documents.as_str().to_string()),
            sub_directory: None,
            format: Some(AudioFormat::default().extension().to_string()),
            notify: Some(false),
            background_budget: Some(Duration::default_background_budget().to_string()),
            duration: Some(Duration::default_duration().to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            directory: other.directory.or(self.directory),
            sub_directory: other.sub_directory.or(self.sub_directory),
            format: other.format.or(self.format),
            notify: other.notify.or(self.notify),
            background_budget: other.background_budget.or(self.background_budget),
            duration: other.duration.or(self.duration),
        }
    }

    /// Get directory as parsed Directory, or DOCUMENTS if not set/invalid
    pub fn directory_or_default(&self) -> Directory {
        self.directory
            .as_deref()
            .map(Directory::from_name_or_default)
            .unwrap_or_default()
    }

    /// Record options built from directory + sub_directory
    pub fn record_options(&self) -> RecordOptions {
        let options = RecordOptions::new(self.directory_or_default());
        match self.sub_directory.as_deref() {
            Some(sub) => options.with_sub_directory(sub),
            None => options,
        }
    }

    /// Get format as parsed AudioFormat, or AAC if not set/invalid
    pub fn format_or_default(&self) -> AudioFormat {
        self.format
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get background budget, or default if not set/invalid
    pub fn background_budget_or_default(&self) -> Duration {
        self.background_budget
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_background_budget)
    }

    /// Get one-shot duration, or default if not set/invalid
    pub fn duration_or_default(&self) -> Duration {
        self.duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_duration)
    }
}
