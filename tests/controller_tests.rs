//! Recording controller scenarios through the public API, driven by the
//! in-process host adapters

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{settle, ScriptedEncoders};
use tempfile::TempDir;
use voice_recorder::application::ports::{
    AudioCategory, AudioSessionEvent, LifecycleEvent, RecordPermission, RouteChangeReason,
};
use voice_recorder::application::{ControllerConfig, RecorderError, RecordingController};
use voice_recorder::domain::recording::{
    parse_timestamp, Directory, RecordOptions, RecordingStatus,
};
use voice_recorder::infrastructure::{
    HostAudioSession, HostBackgroundExecution, HostLifecycle, PlatformDirectories,
};

type Controller = RecordingController<
    HostAudioSession,
    HostBackgroundExecution,
    ScriptedEncoders,
    HostLifecycle,
    PlatformDirectories,
>;

struct Host {
    root: TempDir,
    audio: Arc<HostAudioSession>,
    background: Arc<HostBackgroundExecution>,
    lifecycle: HostLifecycle,
    controller: Controller,
}

fn host_on(audio: HostAudioSession, encoders: ScriptedEncoders, budget: Duration) -> Host {
    let root = TempDir::new().unwrap();
    let audio = Arc::new(audio);
    let background = Arc::new(HostBackgroundExecution::new(budget));
    let lifecycle = HostLifecycle::new();
    let controller = RecordingController::new(
        Arc::clone(&audio),
        Arc::clone(&background),
        encoders,
        lifecycle.clone(),
        PlatformDirectories::with_root(root.path()),
        ControllerConfig::default(),
    );
    Host {
        root,
        audio,
        background,
        lifecycle,
        controller,
    }
}

fn host_with(encoders: ScriptedEncoders, budget: Duration) -> Host {
    host_on(
        HostAudioSession::with_category(AudioCategory::Playback),
        encoders,
        budget,
    )
}

fn host() -> Host {
    host_with(ScriptedEncoders::writing(b"\0\0\0\x18ftypM4A "), Duration::from_secs(30))
}

fn memos() -> RecordOptions {
    RecordOptions::new(Directory::Documents).with_sub_directory("memos")
}

#[tokio::test]
async fn recording_lands_in_the_sub_directory() {
    let host = host();

    host.controller.start(&memos()).await.unwrap();
    assert_eq!(host.audio.category(), AudioCategory::Record);
    assert!(host.audio.is_active());

    let result = host.controller.stop().await.unwrap();
    assert!(result.relative_path.starts_with("memos/recording-"));
    assert!(result.relative_path.ends_with(".aac"));
    assert_eq!(result.mime_type, "audio/aac");
    assert!(result
        .path
        .starts_with(host.root.path().join("documents").join("memos")));
    assert_eq!(&std::fs::read(&result.path).unwrap()[4..8], b"ftyp");

    assert_eq!(host.audio.category(), AudioCategory::Playback);
    assert!(!host.audio.is_active());
    assert_eq!(host.controller.status().await, RecordingStatus::None);
}

#[tokio::test]
async fn second_start_is_rejected_without_side_effects() {
    let host = host();
    host.controller.start(&memos()).await.unwrap();
    let first = host.controller.output_file().await;

    let err = host.controller.start(&memos()).await.unwrap_err();
    assert!(matches!(
        err,
        RecorderError::AlreadyRecording(RecordingStatus::Recording)
    ));
    assert_eq!(host.controller.output_file().await, first);
    assert_eq!(host.controller.status().await, RecordingStatus::Recording);
}

#[tokio::test]
async fn denied_permission_leaves_audio_untouched() {
    let host = host_on(
        HostAudioSession::with_category(AudioCategory::Playback)
            .with_permission(RecordPermission::Denied),
        ScriptedEncoders::writing(b"x"),
        Duration::from_secs(30),
    );

    let err = host.controller.start(&memos()).await.unwrap_err();
    assert!(matches!(err, RecorderError::AccessDenied(_)));
    assert_eq!(host.audio.category(), AudioCategory::Playback);
    assert!(!host.audio.is_active());
    assert_eq!(host.controller.status().await, RecordingStatus::None);
}

#[tokio::test]
async fn encoder_failure_rolls_back_the_audio_claim() {
    let host = host_with(ScriptedEncoders::failing(), Duration::from_secs(30));

    let err = host.controller.start(&memos()).await.unwrap_err();
    assert!(matches!(err, RecorderError::EncoderAllocation(_)));
    assert_eq!(host.audio.category(), AudioCategory::Playback);
    assert!(!host.audio.is_active());
    assert!(host.controller.output_file().await.is_none());
}

#[tokio::test]
async fn interruption_pauses_and_resume_is_honored() {
    let encoders = ScriptedEncoders::writing(b"x");
    let log = Arc::clone(&encoders.log);
    let host = host_with(encoders, Duration::from_secs(30));
    host.controller.start(&memos()).await.unwrap();

    host.audio.publish(AudioSessionEvent::InterruptionBegan);
    settle().await;
    assert_eq!(host.controller.status().await, RecordingStatus::Paused);

    host.audio.publish(AudioSessionEvent::InterruptionEnded {
        should_resume: true,
    });
    settle().await;
    assert_eq!(host.controller.status().await, RecordingStatus::Recording);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["open", "record", "pause", "record"]
    );
}

#[tokio::test]
async fn interruption_end_without_resume_stays_paused() {
    let host = host();
    host.controller.start(&memos()).await.unwrap();

    host.audio.publish(AudioSessionEvent::InterruptionBegan);
    host.audio.publish(AudioSessionEvent::InterruptionEnded {
        should_resume: false,
    });
    settle().await;
    assert_eq!(host.controller.status().await, RecordingStatus::Paused);
}

#[tokio::test]
async fn lost_device_re_arms_capture() {
    let encoders = ScriptedEncoders::writing(b"x");
    let log = Arc::clone(&encoders.log);
    let host = host_with(encoders, Duration::from_secs(30));
    host.controller.start(&memos()).await.unwrap();

    host.audio.publish(AudioSessionEvent::RouteChanged(
        RouteChangeReason::NewDeviceAvailable,
    ));
    host.audio.publish(AudioSessionEvent::RouteChanged(
        RouteChangeReason::OldDeviceUnavailable,
    ));
    settle().await;

    assert_eq!(*log.lock().unwrap(), vec!["open", "record", "record"]);
    assert_eq!(host.controller.status().await, RecordingStatus::Recording);
}

#[tokio::test]
async fn repeated_device_loss_re_arms_each_time() {
    let encoders = ScriptedEncoders::writing(b"x");
    let log = Arc::clone(&encoders.log);
    let host = host_with(encoders, Duration::from_secs(30));
    host.controller.start(&memos()).await.unwrap();

    for _ in 0..2 {
        host.audio.publish(AudioSessionEvent::RouteChanged(
            RouteChangeReason::OldDeviceUnavailable,
        ));
    }
    settle().await;

    assert_eq!(host.controller.status().await, RecordingStatus::Recording);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["open", "record", "record", "record"]
    );
}

#[tokio::test]
async fn one_session_leaves_exactly_one_file() {
    let host = host();
    host.controller.start(&memos()).await.unwrap();
    host.controller.stop().await.unwrap();

    let names: Vec<String> = std::fs::read_dir(host.root.path().join("documents").join("memos"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1, "{:?}", names);
    assert!(parse_timestamp(&names[0]).is_some(), "{}", names[0]);
    assert!(names[0].ends_with(".aac"));
}

#[tokio::test]
async fn background_grant_follows_the_lifecycle() {
    let host = host();
    host.controller.start(&memos()).await.unwrap();

    host.lifecycle.publish(LifecycleEvent::EnteredBackground);
    settle().await;
    assert!(host.controller.has_background_grant().await);
    assert_eq!(host.background.outstanding(), 1);

    // a second background notification does not stack grants
    host.lifecycle.publish(LifecycleEvent::EnteredBackground);
    settle().await;
    assert_eq!(host.background.outstanding(), 1);

    host.lifecycle.publish(LifecycleEvent::EnteredForeground);
    settle().await;
    assert!(!host.controller.has_background_grant().await);
    assert_eq!(host.background.outstanding(), 0);
}

#[tokio::test]
async fn expired_grant_is_released_but_recording_continues() {
    let host = host_with(ScriptedEncoders::writing(b"x"), Duration::from_millis(20));
    host.controller.start(&memos()).await.unwrap();

    host.lifecycle.publish(LifecycleEvent::EnteredBackground);
    settle().await;
    assert!(host.controller.has_background_grant().await);

    tokio::time::sleep(Duration::from_millis(80)).await;
    settle().await;
    assert!(!host.controller.has_background_grant().await);
    assert_eq!(host.background.outstanding(), 0);
    assert_eq!(host.controller.status().await, RecordingStatus::Recording);
}

#[tokio::test]
async fn stop_releases_grant_and_ignores_later_events() {
    let encoders = ScriptedEncoders::writing(b"x");
    let log = Arc::clone(&encoders.log);
    let host = host_with(encoders, Duration::from_secs(30));
    host.controller.start(&memos()).await.unwrap();
    host.lifecycle.publish(LifecycleEvent::EnteredBackground);
    settle().await;

    assert!(host.controller.stop().await.is_some());
    assert_eq!(host.background.outstanding(), 0);

    host.audio.publish(AudioSessionEvent::InterruptionBegan);
    host.lifecycle.publish(LifecycleEvent::EnteredBackground);
    settle().await;
    assert_eq!(host.background.outstanding(), 0);
    assert_eq!(*log.lock().unwrap(), vec!["open", "record", "stop"]);
    assert!(host.controller.stop().await.is_none());
}

#[tokio::test]
async fn paused_time_is_not_counted() {
    let host = host();
    host.controller.start(&memos()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(host.controller.pause().await);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(host.controller.resume().await);

    let result = host.controller.stop().await.unwrap();
    assert!(result.ms_duration() >= 30);
    assert!(result.ms_duration() < 200);
}

#[tokio::test]
async fn output_file_survives_stop_until_next_start() {
    let host = host();
    host.controller.start(&memos()).await.unwrap();
    let result = host.controller.stop().await.unwrap();
    assert_eq!(host.controller.output_file().await, Some(result.path.clone()));

    // file names carry a millisecond timestamp
    tokio::time::sleep(Duration::from_millis(5)).await;
    host.controller
        .start(&RecordOptions::new(Directory::Cache))
        .await
        .unwrap();
    let next = host.controller.output_file().await.unwrap();
    assert_ne!(next, result.path);
    assert!(next.starts_with(host.root.path().join("cache")));
}
