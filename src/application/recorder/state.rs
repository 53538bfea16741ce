//! Controller state shared between the public API and the event pump

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::guards::{AudioClaim, BackgroundGrant};
use super::pump::{EventPump, SessionSignal};
use crate::application::ports::{
    AudioSession, AudioSessionEvent, BackgroundExecution, Encoder, GrantId, LifecycleEvent,
    RouteChangeReason,
};
use crate::domain::recording::{OutputFile, RecordingStatus};
use crate::domain::session::RecordingSession;

/// Resources owned by one recording
pub(crate) struct ActiveRecording<S: AudioSession, B: BackgroundExecution> {
    pub encoder: Box<dyn Encoder>,
    pub output: OutputFile,
    pub claim: AudioClaim<S>,
    pub grant: Option<BackgroundGrant<B>>,
    pub pump: EventPump,
}

pub(crate) struct ControllerState<S: AudioSession, B: BackgroundExecution> {
    pub session: RecordingSession,
    pub active: Option<ActiveRecording<S, B>>,
    /// Survives `stop` so the last file can still be queried
    pub last_output: Option<OutputFile>,
}

impl<S: AudioSession, B: BackgroundExecution> ControllerState<S, B> {
    pub fn new() -> Self {
        Self {
            session: RecordingSession::new(),
            active: None,
            last_output: None,
        }
    }

    pub fn status(&self) -> RecordingStatus {
        self.session.status()
    }

    pub async fn pause(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !self.session.pause(Instant::now()) {
            return false;
        }
        if let Err(e) = active.encoder.pause().await {
            warn!(error = %e, "Encoder refused to pause");
        }
        info!("Recording paused");
        true
    }

    pub async fn resume(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !self.session.resume(Instant::now()) {
            return false;
        }
        if let Err(e) = active.encoder.record().await {
            warn!(error = %e, "Encoder refused to resume");
        }
        info!("Recording resumed");
        true
    }

    pub async fn on_audio_event(&mut self, event: AudioSessionEvent) {
        match event {
            AudioSessionEvent::InterruptionBegan => {
                debug!("Audio interruption began");
                self.pause().await;
            }
            AudioSessionEvent::InterruptionEnded { should_resume } => {
                debug!(should_resume, "Audio interruption ended");
                if !should_resume {
                    return;
                }
                if let Some(active) = &self.active {
                    if let Err(e) = active.claim.reactivate() {
                        warn!(error = %e, "Failed to reactivate audio session");
                    }
                }
                self.resume().await;
            }
            AudioSessionEvent::RouteChanged(RouteChangeReason::OldDeviceUnavailable) => {
                let Some(active) = self.active.as_mut() else {
                    return;
                };
                if !self.session.is_recording() {
                    return;
                }
                info!("Input device went away, re-arming capture");
                if let Err(e) = active.encoder.record().await {
                    warn!(error = %e, "Failed to re-arm capture after route change");
                }
            }
            AudioSessionEvent::RouteChanged(reason) => {
                debug!(%reason, "Audio route changed");
            }
        }
    }

    pub fn on_entered_background(
        &mut self,
        background: &Arc<B>,
        task_name: &str,
        expired: &mpsc::UnboundedSender<GrantId>,
    ) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.grant.is_some() {
            return;
        }
        let expired = expired.clone();
        let on_expiry = Box::new(move |grant: GrantId| {
            let _ = expired.send(grant);
        });
        active.grant = BackgroundGrant::begin(Arc::clone(background), task_name, on_expiry);
        if active.grant.is_none() {
            warn!("Background execution refused, recording may be suspended");
        }
    }

    pub fn on_entered_foreground(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.grant = None;
        }
    }

    pub fn on_grant_expired(&mut self, grant: GrantId) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.grant.as_ref().map(BackgroundGrant::id) == Some(grant) {
            info!(%grant, "Background execution budget exhausted");
            active.grant = None;
        }
    }

    pub fn has_background_grant(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.grant.is_some())
    }
}

/// Everything the event pump needs to reach
pub(crate) struct SessionCore<S: AudioSession, B: BackgroundExecution> {
    pub audio: Arc<S>,
    pub background: Arc<B>,
    pub task_name: String,
    pub state: Mutex<ControllerState<S, B>>,
}

impl<S: AudioSession, B: BackgroundExecution> SessionCore<S, B> {
    pub async fn dispatch(&self, signal: SessionSignal, expired: &mpsc::UnboundedSender<GrantId>) {
        let mut state = self.state.lock().await;
        match signal {
            SessionSignal::Audio(event) => state.on_audio_event(event).await,
            SessionSignal::Lifecycle(LifecycleEvent::EnteredBackground) => {
                state.on_entered_background(&self.background, &self.task_name, expired)
            }
            SessionSignal::Lifecycle(LifecycleEvent::EnteredForeground) => {
                state.on_entered_foreground()
            }
            SessionSignal::GrantExpired(grant) => state.on_grant_expired(grant),
        }
    }
}
