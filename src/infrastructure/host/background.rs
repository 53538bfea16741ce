//! Timer-backed background execution grants
//!
//! Each grant gets a fixed time budget. When it runs out the expiry handler
//! fires; the grant stays outstanding until `end` is called for it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex as StdMutex, PoisonError};
use std::time::Duration as StdDuration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::{BackgroundExecution, ExpiryHandler, GrantId};

pub struct HostBackgroundExecution {
    budget: StdDuration,
    next_id: AtomicU64,
    timers: StdMutex<HashMap<GrantId, JoinHandle<()>>>,
}

impl HostBackgroundExecution {
    /// Grants expire after `budget`
    pub fn new(budget: StdDuration) -> Self {
        Self {
            budget,
            next_id: AtomicU64::new(1),
            timers: StdMutex::new(HashMap::new()),
        }
    }

    /// Number of grants not yet ended
    pub fn outstanding(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl BackgroundExecution for HostBackgroundExecution {
    fn begin(&self, name: &str, on_expiry: ExpiryHandler) -> Option<GrantId> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(task = name, "No runtime to time the background grant, refusing");
            return None;
        };

        let id = GrantId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let budget = self.budget;
        let timer = runtime.spawn(async move {
            tokio::time::sleep(budget).await;
            debug!(grant = %id, "Background budget exhausted");
            on_expiry(id);
        });

        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, timer);
        debug!(task = name, grant = %id, budget_ms = budget.as_millis() as u64, "Background grant issued");
        Some(id)
    }

    fn end(&self, grant: GrantId) {
        let timer = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&grant);
        match timer {
            Some(timer) => timer.abort(),
            None => warn!(%grant, "Ending an unknown background grant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn refuses_without_runtime() {
        let background = HostBackgroundExecution::new(StdDuration::from_secs(1));
        assert!(background.begin("test", Box::new(|_| {})).is_none());
    }

    #[tokio::test]
    async fn expiry_fires_after_budget() {
        let background = HostBackgroundExecution::new(StdDuration::from_millis(20));
        let (tx, rx) = oneshot::channel();
        let id = background
            .begin("test", Box::new(move |id| {
                let _ = tx.send(id);
            }))
            .unwrap();

        assert_eq!(rx.await.unwrap(), id);
        assert_eq!(background.outstanding(), 1);
        background.end(id);
        assert_eq!(background.outstanding(), 0);
    }

    #[tokio::test]
    async fn ended_grant_never_expires() {
        let background = HostBackgroundExecution::new(StdDuration::from_millis(20));
        let (tx, mut rx) = oneshot::channel();
        let id = background
            .begin("test", Box::new(move |id| {
                let _ = tx.send(id);
            }))
            .unwrap();
        background.end(id);

        tokio::time::sleep(StdDuration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn grant_ids_are_distinct() {
        let background = HostBackgroundExecution::new(StdDuration::from_secs(30));
        let first = background.begin("a", Box::new(|_| {})).unwrap();
        let second = background.begin("b", Box::new(|_| {})).unwrap();
        assert_ne!(first, second);
        background.end(first);
        background.end(second);
    }
}
