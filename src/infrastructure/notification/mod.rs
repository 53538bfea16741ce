//! Desktop notifications through the freedesktop / platform service

mod notify_rust;

pub use notify_rust::{NotifyRustNotifier, APP_NAME};

use crate::application::ports::Notifier;

/// Notifier used by `--notify`
pub fn create_notifier() -> Box<dyn Notifier> {
    Box::new(NotifyRustNotifier::new())
}
