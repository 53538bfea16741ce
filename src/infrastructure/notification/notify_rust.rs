//! Desktop notification adapter using notify-rust

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::application::ports::{NotificationError, Notifier, RecordingNotice};

/// Application name shown on notifications
pub const APP_NAME: &str = "VoiceRecorder";

/// Notifier backed by the platform notification service
pub struct NotifyRustNotifier {
    app_name: String,
}

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self::with_app_name(APP_NAME)
    }

    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn build(&self, notice: &RecordingNotice) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(notice.title())
            .body(notice.body())
            .icon(notice.icon_name());
        if notice.is_persistent() {
            notification.timeout(Timeout::Never);
        }
        notification
    }
}

impl Default for NotifyRustNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(&self, notice: &RecordingNotice) -> Result<(), NotificationError> {
        let notification = self.build(notice);

        // show() talks to the notification daemon synchronously
        tokio::task::spawn_blocking(move || {
            notification
                .show()
                .map(drop)
                .map_err(|e| NotificationError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotificationError::SendFailed(format!("Task join error: {}", e)))?
    }
}
