//! Per-session task that turns platform notifications into state changes

use std::sync::Weak;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::state::SessionCore;
use crate::application::ports::{
    AudioSession, AudioSessionEvent, BackgroundExecution, GrantId, LifecycleEvent, Subscription,
};

/// Input to the session's event handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionSignal {
    Audio(AudioSessionEvent),
    Lifecycle(LifecycleEvent),
    GrantExpired(GrantId),
}

/// Handle to the running pump. Dropping it stops the task, which drops
/// both subscriptions.
pub(crate) struct EventPump {
    handle: JoinHandle<()>,
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start pumping events into `core`.
///
/// The pump only holds a weak reference; it ends on its own once the
/// controller is gone.
pub(crate) fn spawn<S, B>(
    core: Weak<SessionCore<S, B>>,
    audio_events: Subscription<AudioSessionEvent>,
    lifecycle_events: Subscription<LifecycleEvent>,
) -> EventPump
where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
{
    let handle = tokio::spawn(run(core, audio_events, lifecycle_events));
    EventPump { handle }
}

async fn run<S, B>(
    core: Weak<SessionCore<S, B>>,
    mut audio_events: Subscription<AudioSessionEvent>,
    mut lifecycle_events: Subscription<LifecycleEvent>,
) where
    S: AudioSession + 'static,
    B: BackgroundExecution + 'static,
{
    let (expired_tx, mut expired_rx) = mpsc::unbounded_channel();

    loop {
        let signal = tokio::select! {
            Some(event) = audio_events.next() => SessionSignal::Audio(event),
            Some(event) = lifecycle_events.next() => SessionSignal::Lifecycle(event),
            Some(grant) = expired_rx.recv() => SessionSignal::GrantExpired(grant),
            else => break,
        };

        let Some(core) = core.upgrade() else {
            break;
        };
        core.dispatch(signal, &expired_tx).await;
    }

    debug!("Session event pump finished");
}
