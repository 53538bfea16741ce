//! Daemon command handler - sends bridge requests to the running daemon

use std::io;

use super::args::DaemonAction;
use super::ipc::create_ipc_client;
use super::presenter::Presenter;
use crate::bridge::{Response, Value};

/// Daemon client errors
#[derive(Debug, thiserror::Error)]
pub enum DaemonCommandError {
    #[error("No daemon running. Start with: voice-recorder --daemon")]
    NotRunning,

    #[error("Failed to communicate with daemon")]
    Io(#[from] io::Error),

    #[error("Daemon rejected {0}")]
    Rejected(&'static str),
}

/// Handle daemon subcommand
pub async fn handle_daemon_command(
    action: DaemonAction,
    presenter: &Presenter,
) -> Result<(), DaemonCommandError> {
    let client = create_ipc_client();
    if !client.is_daemon_running() {
        return Err(DaemonCommandError::NotRunning);
    }

    let request = action.to_request();
    let response = client.send(&request).await?;
    match &response {
        Response::Value {
            value: Value::Flag(flag),
        } if action.is_query() => presenter.output(if *flag { "yes" } else { "no" }),
        other => presenter.response(other),
    }

    if response.is_error() {
        return Err(DaemonCommandError::Rejected(request.method()));
    }
    Ok(())
}
