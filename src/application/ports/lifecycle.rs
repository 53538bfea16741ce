//! Host application lifecycle port

use super::events::Subscription;

/// Foreground/background transitions of the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    EnteredBackground,
    EnteredForeground,
}

/// Port for host application lifecycle notifications
pub trait AppLifecycle: Send + Sync {
    /// Subscribe to background/foreground notifications
    fn subscribe(&self) -> Subscription<LifecycleEvent>;
}
