//! voice-recorder binary

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voice_recorder::cli::app::load_merged_config;
use voice_recorder::cli::config_cmd::handle_config_command;
use voice_recorder::cli::{
    handle_daemon_command, run_daemon, run_oneshot, Cli, Commands, DaemonOptions, Presenter,
    RecordingOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use voice_recorder::infrastructure::XdgConfigStore;

/// Log filter, e.g. `VOICE_RECORDER_LOG=voice_recorder=debug`
const LOG_ENV: &str = "VOICE_RECORDER_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `config` and `daemon` subcommands never start a recording
async fn run_subcommand(command: Commands, presenter: &Presenter) -> ExitCode {
    let outcome = match command {
        Commands::Config { action } => {
            handle_config_command(action, &XdgConfigStore::new(), presenter)
                .await
                .map_err(|e| presenter.error_chain(&e))
        }
        Commands::Daemon { action } => handle_daemon_command(action, presenter)
            .await
            .map_err(|e| presenter.error_chain(&e)),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::from(EXIT_ERROR),
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_tracing();

    let mut cli = Cli::parse();
    let presenter = Presenter::new();

    if let Some(command) = cli.command.take() {
        return run_subcommand(command, &presenter).await;
    }

    // bad flags are usage errors; bad config file values fall back to defaults
    let flags = cli.parse_duration().and_then(|_| cli.parse_background_budget());
    if let Err(e) = flags {
        presenter.error(&e);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let config = load_merged_config(cli.to_config()).await;
    if cli.daemon {
        run_daemon(DaemonOptions::from_config(&config)).await
    } else {
        run_oneshot(RecordingOptions::from_config(&config)).await
    }
}
