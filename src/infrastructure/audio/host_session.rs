//! Host-driven audio session adapter

use std::sync::{Mutex as StdMutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::application::ports::{
    AudioCategory, AudioConfiguration, AudioSession, AudioSessionError, AudioSessionEvent,
    EventHub, RecordPermission, Subscription,
};

#[derive(Debug, Default)]
struct SessionState {
    category: AudioCategory,
    active: bool,
    permission: RecordPermission,
    /// Between an interruption's begin and end notifications
    interrupted: bool,
}

/// In-process audio session.
///
/// Keeps the shared category, the activation flag and the microphone
/// permission, and republishes whatever the host reports through
/// [`HostAudioSession::publish`] or the hub from [`HostAudioSession::events`].
pub struct HostAudioSession {
    state: StdMutex<SessionState>,
    events: EventHub<AudioSessionEvent>,
    /// Own view of the hub, drained lazily to track interruptions
    watcher: StdMutex<Subscription<AudioSessionEvent>>,
}

impl HostAudioSession {
    pub fn new() -> Self {
        Self::with_category(AudioCategory::default())
    }

    /// Start from a category other processes already configured
    pub fn with_category(category: AudioCategory) -> Self {
        let events = EventHub::new();
        Self {
            state: StdMutex::new(SessionState {
                category,
                ..Default::default()
            }),
            watcher: StdMutex::new(events.subscribe()),
            events,
        }
    }

    /// Start with a permission other than granted
    pub fn with_permission(self, permission: RecordPermission) -> Self {
        self.lock().permission = permission;
        self
    }

    /// Publishing side, for adapters that observe the hardware
    pub fn events(&self) -> EventHub<AudioSessionEvent> {
        self.events.clone()
    }

    /// Forward a notification from the host
    pub fn publish(&self, event: AudioSessionEvent) -> usize {
        debug!(?event, "Audio session notification");
        self.events.publish(event)
    }

    pub fn category(&self) -> AudioCategory {
        self.lock().category
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold notifications published since the last look into the state
    fn catch_up(&self) -> MutexGuard<'_, SessionState> {
        let mut watcher = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.lock();
        while let Some(event) = watcher.try_next() {
            match event {
                AudioSessionEvent::InterruptionBegan => state.interrupted = true,
                AudioSessionEvent::InterruptionEnded { .. } => state.interrupted = false,
                AudioSessionEvent::RouteChanged(_) => {}
            }
        }
        state
    }
}

impl Default for HostAudioSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSession for HostAudioSession {
    fn current_configuration(&self) -> AudioConfiguration {
        AudioConfiguration {
            category: self.category(),
        }
    }

    fn set_category(&self, category: AudioCategory) -> Result<(), AudioSessionError> {
        let mut state = self.lock();
        let records = matches!(category, AudioCategory::Record | AudioCategory::PlayAndRecord);
        if records && state.permission != RecordPermission::Granted {
            return Err(AudioSessionError::AccessDenied(format!(
                "microphone permission {}",
                state.permission
            )));
        }
        state.category = category;
        Ok(())
    }

    fn set_active(&self, active: bool) -> Result<(), AudioSessionError> {
        self.lock().active = active;
        Ok(())
    }

    fn subscribe(&self) -> Subscription<AudioSessionEvent> {
        self.events.subscribe()
    }

    fn record_permission(&self) -> RecordPermission {
        self.lock().permission
    }

    /// There is no OS prompt on a desktop host: an undecided permission is
    /// granted on request, a denied one stays denied.
    fn request_record_permission(&self) -> bool {
        let mut state = self.lock();
        if state.permission == RecordPermission::Undetermined {
            info!("Microphone permission granted");
            state.permission = RecordPermission::Granted;
        }
        state.permission == RecordPermission::Granted
    }

    fn is_input_occupied(&self) -> bool {
        self.catch_up().interrupted
    }
}
