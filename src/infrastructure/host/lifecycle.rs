//! Host-driven lifecycle adapter

use tracing::debug;

use crate::application::ports::{AppLifecycle, EventHub, LifecycleEvent, Subscription};

/// Lifecycle notifications reported by the host process
#[derive(Clone, Default)]
pub struct HostLifecycle {
    events: EventHub<LifecycleEvent>,
}

impl HostLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishing side
    pub fn events(&self) -> EventHub<LifecycleEvent> {
        self.events.clone()
    }

    pub fn publish(&self, event: LifecycleEvent) -> usize {
        debug!(?event, "Lifecycle notification");
        self.events.publish(event)
    }
}

impl AppLifecycle for HostLifecycle {
    fn subscribe(&self) -> Subscription<LifecycleEvent> {
        self.events.subscribe()
    }
}
