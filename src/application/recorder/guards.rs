//! Scoped acquisitions of the shared platform resources
//!
//! Both guards release their resource exactly once: explicitly, or on drop
//! when an early return abandons them.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{
    AudioCategory, AudioConfiguration, AudioSession, AudioSessionError, BackgroundExecution,
    ExpiryHandler, GrantId,
};

/// Exclusive record access to the audio hardware.
///
/// Owns the configuration that was in place before the claim and puts it
/// back on release.
pub struct AudioClaim<S: AudioSession> {
    session: Arc<S>,
    prior: Option<AudioConfiguration>,
}

impl<S: AudioSession> AudioClaim<S> {
    /// Snapshot the shared configuration, switch to record mode and activate.
    ///
    /// If activation fails the returned error comes after the prior
    /// configuration has already been restored.
    pub fn acquire(session: Arc<S>) -> Result<Self, AudioSessionError> {
        let prior = session.current_configuration();
        session.set_category(AudioCategory::Record)?;

        // from here on dropping the claim restores `prior`
        let claim = Self {
            session,
            prior: Some(prior),
        };
        claim.session.set_active(true)?;

        debug!(prior = %prior.category, "Exclusive record access acquired");
        Ok(claim)
    }

    /// Re-activate after the OS deactivated the session (interruption end)
    pub fn reactivate(&self) -> Result<(), AudioSessionError> {
        self.session.set_active(true)
    }

    /// Deactivate and restore the prior configuration.
    ///
    /// Both steps are attempted; the first error is returned.
    pub fn release(mut self) -> Result<(), AudioSessionError> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<(), AudioSessionError> {
        let Some(prior) = self.prior.take() else {
            return Ok(());
        };
        let deactivated = self.session.set_active(false);
        let restored = self.session.restore(&prior);
        debug!(restored = %prior.category, "Exclusive record access released");
        deactivated.and(restored)
    }
}

impl<S: AudioSession> Drop for AudioClaim<S> {
    fn drop(&mut self) {
        if let Err(e) = self.release_inner() {
            warn!(error = %e, "Failed to release exclusive audio access");
        }
    }
}

/// An outstanding extended-execution grant
pub struct BackgroundGrant<B: BackgroundExecution> {
    background: Arc<B>,
    id: GrantId,
}

impl<B: BackgroundExecution> BackgroundGrant<B> {
    /// Ask the platform for a grant. `None` if it refused.
    pub fn begin(background: Arc<B>, name: &str, on_expiry: ExpiryHandler) -> Option<Self> {
        let id = background.begin(name, on_expiry)?;
        debug!(grant = %id, "Background execution granted");
        Some(Self { background, id })
    }

    /// The platform's id for this grant
    pub fn id(&self) -> GrantId {
        self.id
    }
}

impl<B: BackgroundExecution> Drop for BackgroundGrant<B> {
    fn drop(&mut self) {
        self.background.end(self.id);
        debug!(grant = %self.id, "Background execution released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{AudioSessionEvent, EventHub, Subscription};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAudio {
        calls: Mutex<Vec<String>>,
        fail_activate: bool,
        hub: EventHub<AudioSessionEvent>,
    }

    impl RecordingAudio {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AudioSession for RecordingAudio {
        fn current_configuration(&self) -> AudioConfiguration {
            AudioConfiguration {
                category: AudioCategory::Playback,
            }
        }

        fn set_category(&self, category: AudioCategory) -> Result<(), AudioSessionError> {
            self.calls.lock().unwrap().push(format!("category:{}", category));
            Ok(())
        }

        fn set_active(&self, active: bool) -> Result<(), AudioSessionError> {
            self.calls.lock().unwrap().push(format!("active:{}", active));
            if active && self.fail_activate {
                return Err(AudioSessionError::AccessDenied("busy".into()));
            }
            Ok(())
        }

        fn subscribe(&self) -> Subscription<AudioSessionEvent> {
            self.hub.subscribe()
        }
    }

    #[test]
    fn release_restores_prior_category_once() {
        let audio = Arc::new(RecordingAudio::default());
        let claim = AudioClaim::acquire(Arc::clone(&audio)).unwrap();
        claim.release().unwrap();
        assert_eq!(
            audio.calls(),
            vec![
                "category:record",
                "active:true",
                "active:false",
                "category:playback"
            ]
        );
    }

    #[test]
    fn failed_activation_rolls_back() {
        let audio = Arc::new(RecordingAudio {
            fail_activate: true,
            ..Default::default()
        });
        assert!(AudioClaim::acquire(Arc::clone(&audio)).is_err());
        assert_eq!(
            audio.calls(),
            vec![
                "category:record",
                "active:true",
                "active:false",
                "category:playback"
            ]
        );
    }

    #[test]
    fn dropped_claim_releases() {
        let audio = Arc::new(RecordingAudio::default());
        drop(AudioClaim::acquire(Arc::clone(&audio)).unwrap());
        assert_eq!(audio.calls().last().map(String::as_str), Some("category:playback"));
    }

    struct CountingBackground {
        begun: AtomicUsize,
        ended: AtomicUsize,
        refuse: bool,
    }

    impl BackgroundExecution for CountingBackground {
        fn begin(&self, _name: &str, _on_expiry: ExpiryHandler) -> Option<GrantId> {
            if self.refuse {
                return None;
            }
            let n = self.begun.fetch_add(1, Ordering::SeqCst);
            Some(GrantId(n as u64 + 1))
        }

        fn end(&self, _grant: GrantId) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn grant_ends_on_drop() {
        let background = Arc::new(CountingBackground {
            begun: AtomicUsize::new(0),
            ended: AtomicUsize::new(0),
            refuse: false,
        });
        let grant =
            BackgroundGrant::begin(Arc::clone(&background), "test", Box::new(|_| {})).unwrap();
        assert_eq!(grant.id(), GrantId(1));
        drop(grant);
        assert_eq!(background.ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refused_grant_is_none() {
        let background = Arc::new(CountingBackground {
            begun: AtomicUsize::new(0),
            ended: AtomicUsize::new(0),
            refuse: true,
        });
        assert!(BackgroundGrant::begin(Arc::clone(&background), "test", Box::new(|_| {})).is_none());
        assert_eq!(background.ended.load(Ordering::SeqCst), 0);
    }
}
