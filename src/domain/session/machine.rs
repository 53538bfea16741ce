//! Recording session state machine

use std::time::{Duration as StdDuration, Instant};

use thiserror::Error;

use crate::domain::recording::RecordingStatus;

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: RecordingStatus,
    pub action: String,
}

/// Recording session entity.
/// Tracks the lifecycle status and how long capture has actually run.
///
/// State machine:
///   NONE -> RECORDING (begin)
///   RECORDING -> PAUSED (pause)
///   PAUSED -> RECORDING (resume)
///   RECORDING | PAUSED -> NONE (end)
///
/// `pause`/`resume`/`end` in the wrong state are no-ops that report `false`
/// (or `None`); only `begin` treats a wrong state as an error.
#[derive(Debug, Default)]
pub struct RecordingSession {
    status: RecordingStatus,
    /// Capture time accumulated before the current running stretch
    accumulated: StdDuration,
    /// Start of the current running stretch (only while RECORDING)
    running_since: Option<Instant>,
}

impl RecordingSession {
    /// Create a new session in the NONE state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current status
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    /// Check if a session is alive (recording or paused)
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.status == RecordingStatus::Recording
    }

    /// Check if currently paused
    pub fn is_paused(&self) -> bool {
        self.status == RecordingStatus::Paused
    }

    /// Transition from NONE to RECORDING
    pub fn begin(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        if self.status != RecordingStatus::None {
            return Err(InvalidStateTransition {
                current_state: self.status,
                action: "start recording".to_string(),
            });
        }
        self.status = RecordingStatus::Recording;
        self.accumulated = StdDuration::ZERO;
        self.running_since = Some(now);
        Ok(())
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.status != RecordingStatus::Recording {
            return false;
        }
        self.close_stretch(now);
        self.status = RecordingStatus::Paused;
        true
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.status != RecordingStatus::Paused {
            return false;
        }
        self.running_since = Some(now);
        self.status = RecordingStatus::Recording;
        true
    }

    /// Transition to NONE, returning the total capture time.
    /// Returns `None` if there was no session.
    pub fn end(&mut self, now: Instant) -> Option<StdDuration> {
        if !self.status.is_active() {
            return None;
        }
        self.close_stretch(now);
        self.status = RecordingStatus::None;
        Some(std::mem::take(&mut self.accumulated))
    }

    /// Capture time so far, excluding paused stretches
    pub fn active_time(&self, now: Instant) -> StdDuration {
        let running = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        self.accumulated + running
    }

    fn close_stretch(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + StdDuration::from_millis(ms)
    }

    #[test]
    fn new_session_is_none() {
        let session = RecordingSession::new();
        assert_eq!(session.status(), RecordingStatus::None);
        assert!(!session.is_active());
    }

    #[test]
    fn begin_from_none() {
        let mut session = RecordingSession::new();
        assert!(session.begin(Instant::now()).is_ok());
        assert!(session.is_recording());
    }

    #[test]
    fn begin_while_active_fails() {
        let now = Instant::now();
        let mut session = RecordingSession::new();
        session.begin(now).unwrap();

        let err = session.begin(now).unwrap_err();
        assert_eq!(err.current_state, RecordingStatus::Recording);
        assert!(err.action.contains("start recording"));

        session.pause(now);
        let err = session.begin(now).unwrap_err();
        assert_eq!(err.current_state, RecordingStatus::Paused);
    }

    #[test]
    fn pause_only_from_recording() {
        let now = Instant::now();
        let mut session = RecordingSession::new();
        assert!(!session.pause(now));
        assert_eq!(session.status(), RecordingStatus::None);

        session.begin(now).unwrap();
        assert!(session.pause(now));
        assert!(session.is_paused());
        assert!(!session.pause(now));
        assert!(session.is_paused());
    }

    #[test]
    fn resume_only_from_paused() {
        let now = Instant::now();
        let mut session = RecordingSession::new();
        assert!(!session.resume(now));

        session.begin(now).unwrap();
        assert!(!session.resume(now));
        assert!(session.is_recording());

        session.pause(now);
        assert!(session.resume(now));
        assert!(session.is_recording());
    }

    #[test]
    fn end_returns_none_when_idle() {
        let mut session = RecordingSession::new();
        assert!(session.end(Instant::now()).is_none());
        assert_eq!(session.status(), RecordingStatus::None);
    }

    #[test]
    fn paused_time_is_excluded() {
        let base = Instant::now();
        let mut session = RecordingSession::new();
        session.begin(base).unwrap();
        session.pause(at(base, 1_000));
        session.resume(at(base, 5_000));
        assert_eq!(session.active_time(at(base, 5_500)), StdDuration::from_millis(1_500));

        let total = session.end(at(base, 6_000)).unwrap();
        assert_eq!(total, StdDuration::from_millis(2_000));
    }

    #[test]
    fn end_while_paused_counts_until_pause() {
        let base = Instant::now();
        let mut session = RecordingSession::new();
        session.begin(base).unwrap();
        session.pause(at(base, 750));

        let total = session.end(at(base, 9_000)).unwrap();
        assert_eq!(total, StdDuration::from_millis(750));
    }

    #[test]
    fn full_cycle_then_fresh_session() {
        let base = Instant::now();
        let mut session = RecordingSession::new();
        session.begin(base).unwrap();
        session.end(at(base, 100)).unwrap();
        assert_eq!(session.status(), RecordingStatus::None);

        session.begin(at(base, 200)).unwrap();
        assert_eq!(session.active_time(at(base, 250)), StdDuration::from_millis(50));
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: RecordingStatus::Paused,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("PAUSED"));
    }
}
