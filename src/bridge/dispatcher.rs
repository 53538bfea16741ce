//! Routes bridge requests to the recording controller

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::request::Request;
use super::response::{BridgeError, ErrorCode, RecordData, Response};
use crate::application::ports::{
    AppLifecycle, AudioSession, AudioSessionEvent, BackgroundExecution, DirectoryResolver,
    EncoderFactory, EventHub, LifecycleEvent, Notifier, RecordPermission, RecordingNotice,
    RouteChangeReason,
};
use crate::application::{RecorderError, RecordingController, RecordingResult};
use crate::domain::recording::{Directory, RecordOptions, RecordingStatus};

/// Anything that answers bridge requests
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: Request) -> Response;

    /// Parse and answer one protocol line
    async fn handle_line(&self, line: &str) -> Response {
        match Request::parse(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => e.into(),
        }
    }
}

/// Borrowed fields of a start request
struct StartRequest<'a> {
    directory: Option<&'a str>,
    sub_directory: Option<&'a str>,
    title: Option<&'a str>,
    message: Option<&'a str>,
}

/// The bridge surface over a [`RecordingController`]
pub struct Bridge<S, B, E, L, D>
where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
    E: EncoderFactory,
    L: AppLifecycle,
    D: DirectoryResolver,
{
    controller: Arc<RecordingController<S, B, E, L, D>>,
    audio_events: EventHub<AudioSessionEvent>,
    lifecycle_events: EventHub<LifecycleEvent>,
    defaults: RecordOptions,
    notifier: Option<Box<dyn Notifier>>,
}

impl<S, B, E, L, D> Bridge<S, B, E, L, D>
where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
    E: EncoderFactory,
    L: AppLifecycle,
    D: DirectoryResolver,
{
    /// Host notifications are republished on the given hubs
    pub fn new(
        controller: Arc<RecordingController<S, B, E, L, D>>,
        audio_events: EventHub<AudioSessionEvent>,
        lifecycle_events: EventHub<LifecycleEvent>,
    ) -> Self {
        Self {
            controller,
            audio_events,
            lifecycle_events,
            defaults: RecordOptions::default(),
            notifier: None,
        }
    }

    /// Options used when a start request leaves them out
    pub fn with_defaults(mut self, defaults: RecordOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Show desktop notifications on start and stop
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn controller(&self) -> &Arc<RecordingController<S, B, E, L, D>> {
        &self.controller
    }

    fn record_options(&self, directory: Option<&str>, sub_directory: Option<&str>) -> RecordOptions {
        let Some(directory) = directory else {
            return match sub_directory {
                Some(sub) => RecordOptions::new(self.defaults.directory()).with_sub_directory(sub),
                None => self.defaults.clone(),
            };
        };
        let options = RecordOptions::new(Directory::from_name_or_default(directory));
        match sub_directory {
            Some(sub) => options.with_sub_directory(sub),
            None => options,
        }
    }

    /// Device, permission and microphone checks made before starting
    fn check_can_start(&self) -> Result<(), BridgeError> {
        if !self.controller.can_record() {
            return Err(BridgeError::new(ErrorCode::CannotRecordOnThisPhone));
        }
        let permission = self.controller.record_permission();
        if permission != RecordPermission::Granted {
            return Err(BridgeError::with_cause(
                ErrorCode::MissingPermission,
                format!("microphone permission {}", permission),
            ));
        }
        if self.controller.is_input_occupied() {
            return Err(BridgeError::new(ErrorCode::MicrophoneBeingUsed));
        }
        Ok(())
    }

    async fn start(&self, request: StartRequest<'_>) -> Result<Response, BridgeError> {
        self.check_can_start()?;

        let options = self.record_options(request.directory, request.sub_directory);
        self.controller.start(&options).await.map_err(|e| match e {
            RecorderError::AlreadyRecording(_) => BridgeError::new(ErrorCode::AlreadyRecording),
            denied @ RecorderError::AccessDenied(_) => {
                BridgeError::caused_by(ErrorCode::MissingPermission, &denied)
            }
            other => BridgeError::caused_by(ErrorCode::FailedToRecord, &other),
        })?;

        self.notify(RecordingNotice::started(request.title, request.message))
            .await;
        Ok(Response::flag(true))
    }

    async fn stop(&self) -> Result<Response, BridgeError> {
        let result = self.controller.stop().await.ok_or_else(|| {
            BridgeError::with_cause(ErrorCode::FailedToFetchRecording, "no recording to stop")
        })?;
        let data = Self::record_data(&result)?;

        self.notify(RecordingNotice::Saved(data.path.clone())).await;
        Ok(Response::recording(data))
    }

    /// Checks the file actually holds audio
    fn record_data(result: &RecordingResult) -> Result<RecordData, BridgeError> {
        let len = std::fs::metadata(&result.path).map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            return Err(BridgeError::with_cause(
                ErrorCode::EmptyRecording,
                format!("{} holds no audio", result.path.display()),
            ));
        }
        Ok(RecordData::new(
            result.ms_duration(),
            result.mime_type,
            &result.relative_path,
            &result.path,
        ))
    }

    /// Pause and resume report a missing session as an error
    async fn require_session(&self) -> Result<(), BridgeError> {
        if self.controller.status().await == RecordingStatus::None {
            return Err(BridgeError::new(ErrorCode::RecordingHasNotStarted));
        }
        Ok(())
    }

    async fn notify(&self, notice: RecordingNotice) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.notify(&notice).await {
            warn!(error = %e, "Notification failed");
        }
    }

    fn forward_audio(&self, event: AudioSessionEvent) -> Response {
        let delivered = self.audio_events.publish(event);
        debug!(?event, delivered, "Forwarded audio notification");
        Response::flag(true)
    }

    fn forward_lifecycle(&self, event: LifecycleEvent) -> Response {
        let delivered = self.lifecycle_events.publish(event);
        debug!(?event, delivered, "Forwarded lifecycle notification");
        Response::flag(true)
    }
}

#[async_trait]
impl<S, B, E, L, D> RequestHandler for Bridge<S, B, E, L, D>
where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
    E: EncoderFactory + 'static,
    L: AppLifecycle + 'static,
    D: DirectoryResolver + 'static,
{
    async fn handle(&self, request: Request) -> Response {
        debug!(method = request.method(), "Bridge request");
        match request {
            Request::StartRecording {
                directory,
                sub_directory,
                title,
                message,
            } => self
                .start(StartRequest {
                    directory: directory.as_deref(),
                    sub_directory: sub_directory.as_deref(),
                    title: title.as_deref(),
                    message: message.as_deref(),
                })
                .await
                .into(),
            Request::StopRecording => self.stop().await.into(),
            Request::PauseRecording => match self.require_session().await {
                Ok(()) => Response::flag(self.controller.pause().await),
                Err(e) => e.into(),
            },
            Request::ResumeRecording => match self.require_session().await {
                Ok(()) => Response::flag(self.controller.resume().await),
                Err(e) => e.into(),
            },
            Request::GetCurrentStatus => Response::status(self.controller.status().await),
            Request::GetOutputFile => Response::path(
                self.controller
                    .output_file()
                    .await
                    .map(|path| path.display().to_string()),
            ),
            Request::CanDeviceVoiceRecord => Response::flag(self.controller.can_record()),
            Request::HasAudioRecordingPermission => Response::flag(
                self.controller.record_permission() == RecordPermission::Granted,
            ),
            Request::RequestAudioRecordingPermission => {
                Response::flag(self.controller.request_record_permission())
            }
            Request::InterruptionBegan => self.forward_audio(AudioSessionEvent::InterruptionBegan),
            Request::InterruptionEnded { should_resume } => {
                self.forward_audio(AudioSessionEvent::InterruptionEnded { should_resume })
            }
            Request::RouteChanged { reason } => match reason.parse::<RouteChangeReason>() {
                Ok(reason) => self.forward_audio(AudioSessionEvent::RouteChanged(reason)),
                Err(e) => BridgeError::invalid_request(e.to_string()).into(),
            },
            Request::EnteredBackground => self.forward_lifecycle(LifecycleEvent::EnteredBackground),
            Request::EnteredForeground => self.forward_lifecycle(LifecycleEvent::EnteredForeground),
        }
    }
}
