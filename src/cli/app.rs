//! Main app runner for one-shot mode

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tracing::warn;

use crate::application::ports::{ConfigStore, Notifier, RecordingNotice};
use crate::application::{ControllerConfig, RecordingController};
use crate::domain::config::AppConfig;
use crate::domain::recording::{Duration, EncoderSettings, RecordingStatus};
use crate::infrastructure::{
    create_notifier, CpalEncoderFactory, HostAudioSession, HostBackgroundExecution, HostLifecycle,
    PlatformDirectories, XdgConfigStore,
};

use super::args::RecordingOptions;
use super::presenter::{format_millis, Presenter};
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Progress redraw interval
const TICK: StdDuration = StdDuration::from_millis(100);

/// Record once for the configured duration (Ctrl+C stops early)
pub async fn run_oneshot(options: RecordingOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    // nothing backgrounds a one-shot run; grants use the default budget
    let audio = Arc::new(HostAudioSession::new());
    let background = Arc::new(HostBackgroundExecution::new(
        Duration::default_background_budget().as_std(),
    ));
    let encoders = CpalEncoderFactory::with_route_events(audio.events());
    let controller = RecordingController::new(
        audio,
        background,
        encoders,
        HostLifecycle::new(),
        PlatformDirectories::new(),
        ControllerConfig {
            settings: EncoderSettings::voice().with_format(options.format),
            ..Default::default()
        },
    );
    let notifier = options.notify.then(create_notifier);

    if let Err(e) = controller.start(&options.record).await {
        presenter.error_chain(&e);
        notify(notifier.as_deref(), RecordingNotice::Failed(describe(&e))).await;
        return ExitCode::from(EXIT_ERROR);
    }
    notify(notifier.as_deref(), RecordingNotice::started(None, None)).await;

    let total_ms = options.duration.as_millis();
    let mut ticker = tokio::time::interval(TICK);
    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                presenter.finish_progress();
                presenter.info("Interrupted, saving what was recorded");
                break;
            }
            _ = ticker.tick() => {
                let elapsed_ms = controller.elapsed().await.as_millis() as u64;
                let paused = controller.status().await == RecordingStatus::Paused;
                presenter.update_recording_progress(elapsed_ms, total_ms, paused);
                if elapsed_ms >= total_ms {
                    break;
                }
            }
        }
    }
    presenter.finish_progress();

    let Some(result) = controller.stop().await else {
        presenter.error("Recording ended unexpectedly");
        return ExitCode::from(EXIT_ERROR);
    };

    let size = std::fs::metadata(&result.path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        presenter.error("No audio was captured");
        notify(
            notifier.as_deref(),
            RecordingNotice::Failed("No audio was captured".to_string()),
        )
        .await;
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.success(&format!(
        "Saved {} ({}, {})",
        result.relative_path,
        format_millis(result.ms_duration()),
        result.mime_type
    ));
    notify(
        notifier.as_deref(),
        RecordingNotice::Saved(result.relative_path.clone()),
    )
    .await;
    presenter.output(&result.path.display().to_string());

    ExitCode::from(EXIT_SUCCESS)
}

async fn notify(notifier: Option<&dyn Notifier>, notice: RecordingNotice) {
    let Some(notifier) = notifier else {
        return;
    };
    if let Err(e) = notifier.notify(&notice).await {
        warn!(error = %e, "Notification failed");
    }
}

/// The error and its sources on one line
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    load_merged_config_from(&XdgConfigStore::new(), cli_config).await
}

/// Merge: defaults < file < cli
pub async fn load_merged_config_from<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = store.load().await.unwrap_or_else(|e| {
        warn!(error = %e, path = %store.path().display(), "Ignoring unreadable config file");
        AppConfig::empty()
    });

    AppConfig::defaults().merge(file_config).merge(cli_config)
}
