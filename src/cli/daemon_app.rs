//! Daemon app runner
//!
//! Hosts the recorder bridge on a local socket until SIGINT or SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{ControllerConfig, RecordingController};
use crate::bridge::{Bridge, RequestHandler};
use crate::domain::recording::EncoderSettings;
use crate::infrastructure::{
    create_notifier, CpalEncoderFactory, HostAudioSession, HostBackgroundExecution, HostLifecycle,
    PlatformDirectories,
};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::DaemonOptions;
use super::ipc::create_ipc_server;
use super::pid_file::PidFile;
use super::presenter::Presenter;
use super::signals::DaemonSignalHandler;

/// Run daemon mode
pub async fn run_daemon(options: DaemonOptions) -> ExitCode {
    let presenter = Presenter::new();

    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        presenter.error_chain(&e);
        return ExitCode::from(EXIT_ERROR);
    }

    let mut signals = match DaemonSignalHandler::new() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let audio = Arc::new(HostAudioSession::new());
    let lifecycle = HostLifecycle::new();
    let audio_events = audio.events();
    let lifecycle_events = lifecycle.events();
    let controller = Arc::new(RecordingController::new(
        Arc::clone(&audio),
        Arc::new(HostBackgroundExecution::new(options.background_budget.as_std())),
        CpalEncoderFactory::with_route_events(audio.events()),
        lifecycle,
        PlatformDirectories::new(),
        ControllerConfig {
            settings: EncoderSettings::voice().with_format(options.format),
            ..Default::default()
        },
    ));

    let mut bridge = Bridge::new(Arc::clone(&controller), audio_events, lifecycle_events)
        .with_defaults(options.record.clone());
    if options.notify {
        bridge = bridge.with_notifier(create_notifier());
    }
    let handler: Arc<dyn RequestHandler> = Arc::new(bridge);

    let mut server = create_ipc_server();
    if let Err(e) = server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let socket = server.path();

    // dropping the server removes the socket file
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(handler).await {
            warn!(error = %e, "Socket server stopped");
        }
    });

    presenter.daemon_status("Started, waiting for requests...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | Directory: {} | SIGINT: exit",
        std::process::id(),
        socket,
        options.record.directory()
    ));

    let signal = signals.recv().await;
    info!(signal = signal.map(|s| s.name()), "Daemon shutting down");
    presenter.daemon_status("Shutting down...");

    server_task.abort();
    let _ = server_task.await;

    if let Some(result) = controller.stop().await {
        presenter.info(&format!(
            "Stopped active recording: {}",
            result.path.display()
        ));
    }

    let _ = pid_file.release();

    if signal.is_some() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
