//! Desktop notification port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to show notification: {0}")]
    SendFailed(String),
}

/// Default title of the in-progress notice
pub const STARTED_TITLE: &str = "Recording in progress";
/// Default body of the in-progress notice
pub const STARTED_MESSAGE: &str = "Recording audio";

/// What the user is told about a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingNotice {
    /// Shown for as long as capture runs; the caller may word it
    Started { title: String, message: String },
    /// Carries the saved file's path
    Saved(String),
    /// Carries a short reason
    Failed(String),
}

impl RecordingNotice {
    /// In-progress notice, defaults where the caller gave no text
    pub fn started(title: Option<&str>, message: Option<&str>) -> Self {
        Self::Started {
            title: title.unwrap_or(STARTED_TITLE).to_string(),
            message: message.unwrap_or(STARTED_MESSAGE).to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Started { title, .. } => title,
            Self::Saved(_) => "Recording saved",
            Self::Failed(_) => "Recording failed",
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Started { message, .. } => message,
            Self::Saved(path) => path,
            Self::Failed(reason) => reason,
        }
    }

    /// freedesktop icon name
    pub const fn icon_name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "audio-input-microphone",
            Self::Saved(_) => "document-save",
            Self::Failed(_) => "dialog-error",
        }
    }

    /// Whether the notice should stay up until replaced
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &RecordingNotice) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_notice_is_persistent() {
        let notice = RecordingNotice::started(None, None);
        assert_eq!(notice.title(), "Recording in progress");
        assert_eq!(notice.body(), "Recording audio");
        assert!(notice.is_persistent());
    }

    #[test]
    fn started_notice_takes_caller_text() {
        let notice = RecordingNotice::started(Some("Dictation"), None);
        assert_eq!(notice.title(), "Dictation");
        assert_eq!(notice.body(), STARTED_MESSAGE);
    }

    #[test]
    fn saved_and_failed_carry_their_text() {
        let saved = RecordingNotice::Saved("memos/recording-1.flac".into());
        assert_eq!(saved.body(), "memos/recording-1.flac");
        assert!(!saved.is_persistent());

        let failed = RecordingNotice::Failed("No audio was captured".into());
        assert_eq!(failed.icon_name(), "dialog-error");
        assert_eq!(failed.body(), "No audio was captured");
    }
}
