//! Repeating registry refresh.
//!
//! [`spawn_poller`] refreshes once immediately, then once per interval, on a
//! tokio task. The returned [`PollHandle`] owns that task: dropping it (or
//! calling [`PollHandle::stop`]) aborts the loop, so no timer outlives its
//! owner. Ticks missed while a slow fetch is outstanding are skipped rather
//! than replayed in a burst.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::registry::{DocumentRegistry, RefreshOutcome};

pub struct PollHandle {
    task: Option<JoinHandle<()>>,
    interval: Duration,
}

impl PollHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Abort the poll loop. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("poller stopped");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start polling `registry` every `interval`. Must be called inside a tokio runtime.
pub fn spawn_poller(registry: Arc<DocumentRegistry>, interval: Duration) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if registry.refresh().await == RefreshOutcome::Skipped {
                debug!("poll tick skipped");
            }
        }
    });
    debug!(interval_ms = interval.as_millis() as u64, "poller started");

    PollHandle {
        task: Some(task),
        interval,
    }
}
