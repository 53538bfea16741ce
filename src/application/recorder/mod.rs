//! Recording controller use case
//!
//! Owns at most one recording session at a time and coordinates the audio
//! session, the encoder and background execution around it.

mod guards;
mod pump;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::recording::{
    epoch_millis, EncoderSettings, OutputFile, RecordOptions, RecordingStatus,
};
use crate::domain::session::InvalidStateTransition;

use super::ports::{
    AppLifecycle, AudioSession, AudioSessionError, BackgroundExecution, DirectoryResolver,
    EncoderError, EncoderFactory, RecordPermission,
};

pub use guards::{AudioClaim, BackgroundGrant};
use state::{ActiveRecording, ControllerState, SessionCore};

/// Name under which background execution is requested
pub const BACKGROUND_TASK_NAME: &str = "VoiceRecorder";

/// Why a recording could not be started
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("A recording is already in progress ({0})")]
    AlreadyRecording(RecordingStatus),

    #[error("Cannot claim the microphone")]
    AccessDenied(#[source] AudioSessionError),

    #[error("Cannot write the recording")]
    FileSystem(#[source] EncoderError),

    #[error("Cannot start the encoder")]
    EncoderAllocation(#[source] EncoderError),
}

impl From<EncoderError> for RecorderError {
    fn from(e: EncoderError) -> Self {
        if e.is_file_system() {
            Self::FileSystem(e)
        } else {
            Self::EncoderAllocation(e)
        }
    }
}

impl From<InvalidStateTransition> for RecorderError {
    fn from(e: InvalidStateTransition) -> Self {
        Self::AlreadyRecording(e.current_state)
    }
}

/// Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Encoder settings for every recording
    pub settings: EncoderSettings,
    /// Name passed to the platform when asking for background execution
    pub background_task_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settings: EncoderSettings::voice(),
            background_task_name: BACKGROUND_TASK_NAME.to_string(),
        }
    }
}

/// What a finished recording produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingResult {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Path relative to the base directory
    pub relative_path: String,
    pub mime_type: &'static str,
    /// Capture time, excluding paused stretches
    pub duration: StdDuration,
}

impl RecordingResult {
    pub fn ms_duration(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}

/// Recording controller
pub struct RecordingController<S, B, E, L, D>
where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
    E: EncoderFactory,
    L: AppLifecycle,
    D: DirectoryResolver,
{
    core: Arc<SessionCore<S, B>>,
    encoders: E,
    lifecycle: L,
    directories: D,
    settings: EncoderSettings,
}

impl<S, B, E, L, D> RecordingController<S, B, E, L, D>
where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
    E: EncoderFactory,
    L: AppLifecycle,
    D: DirectoryResolver,
{
    /// Create a controller. The audio session and background execution are
    /// shared with the per-session event pump.
    pub fn new(
        audio: Arc<S>,
        background: Arc<B>,
        encoders: E,
        lifecycle: L,
        directories: D,
        config: ControllerConfig,
    ) -> Self {
        Self {
            core: Arc::new(SessionCore {
                audio,
                background,
                task_name: config.background_task_name,
                state: Mutex::new(ControllerState::new()),
            }),
            encoders,
            lifecycle,
            directories,
            settings: config.settings,
        }
    }

    /// Start a new recording.
    ///
    /// Fails without side effects if a session is already alive. Any failure
    /// after the microphone was claimed puts the audio configuration back.
    pub async fn start(&self, options: &RecordOptions) -> Result<(), RecorderError> {
        let mut state = self.core.state.lock().await;
        if state.session.is_active() {
            return Err(RecorderError::AlreadyRecording(state.status()));
        }

        let directory = self.output_directory(options);
        let claim = AudioClaim::acquire(Arc::clone(&self.core.audio))
            .map_err(RecorderError::AccessDenied)?;

        let output = OutputFile::new(
            &directory,
            options.sub_directory(),
            epoch_millis(),
            self.settings.format,
        );
        let mut encoder = self.encoders.open(output.path(), &self.settings)?;
        encoder.record().await?;

        state.session.begin(Instant::now())?;
        let pump = pump::spawn(
            Arc::downgrade(&self.core),
            self.core.audio.subscribe(),
            self.lifecycle.subscribe(),
        );

        info!(path = %output.path().display(), "Recording started");
        state.last_output = Some(output.clone());
        state.active = Some(ActiveRecording {
            encoder,
            output,
            claim,
            grant: None,
            pump,
        });
        Ok(())
    }

    /// Stop the current recording and finalize its file.
    ///
    /// Returns `None` if nothing was recording. Teardown failures are logged
    /// and never prevent the session from ending.
    pub async fn stop(&self) -> Option<RecordingResult> {
        let mut state = self.core.state.lock().await;
        let Some(active) = state.active.take() else {
            debug!("Stop requested with no active recording");
            return None;
        };
        let duration = state.session.end(Instant::now()).unwrap_or_default();

        let ActiveRecording {
            mut encoder,
            output,
            claim,
            grant,
            pump,
        } = active;

        if let Err(e) = encoder.stop().await {
            warn!(error = %e, "Encoder did not finalize cleanly");
        }
        drop(encoder);
        if let Err(e) = claim.release() {
            warn!(error = %e, "Failed to restore the audio configuration");
        }
        drop(pump);
        drop(grant);

        info!(
            path = %output.path().display(),
            duration_ms = duration.as_millis() as u64,
            "Recording stopped"
        );
        Some(RecordingResult {
            path: output.path().to_path_buf(),
            relative_path: output.relative().to_string(),
            mime_type: output.format().mime_type(),
            duration,
        })
    }

    /// Pause capture. `false` unless currently recording.
    pub async fn pause(&self) -> bool {
        self.core.state.lock().await.pause().await
    }

    /// Resume capture. `false` unless currently paused.
    pub async fn resume(&self) -> bool {
        self.core.state.lock().await.resume().await
    }

    pub async fn status(&self) -> RecordingStatus {
        self.core.state.lock().await.status()
    }

    /// Path of the current or most recent recording
    pub async fn output_file(&self) -> Option<PathBuf> {
        let state = self.core.state.lock().await;
        state
            .last_output
            .as_ref()
            .map(|output| output.path().to_path_buf())
    }

    /// Capture time of the current session so far
    pub async fn elapsed(&self) -> StdDuration {
        self.core
            .state
            .lock()
            .await
            .session
            .active_time(Instant::now())
    }

    /// Whether the current session holds a background execution grant
    pub async fn has_background_grant(&self) -> bool {
        self.core.state.lock().await.has_background_grant()
    }

    /// Whether this machine has anything to capture from
    pub fn can_record(&self) -> bool {
        self.encoders.can_record()
    }

    pub fn record_permission(&self) -> RecordPermission {
        self.core.audio.record_permission()
    }

    /// Ask for microphone permission; `true` if capture is now allowed
    pub fn request_record_permission(&self) -> bool {
        self.core.audio.request_record_permission()
    }

    /// Another client holds the input right now
    pub fn is_input_occupied(&self) -> bool {
        self.core.audio.is_input_occupied()
    }

    fn output_directory(&self, options: &RecordOptions) -> PathBuf {
        let base = self
            .directories
            .base_dir(options.directory())
            .unwrap_or_else(|| {
                warn!(
                    directory = %options.directory(),
                    "Directory unavailable, falling back to the temp directory"
                );
                std::env::temp_dir()
            });

        let Some(sub) = options.sub_directory() else {
            return base;
        };
        let dir = base.join(sub);
        if !dir.is_dir() {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                warn!(path = %dir.display(), error = %e, "Failed to create sub-directory");
            }
        }
        dir
    }
}
