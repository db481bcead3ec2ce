use std::sync::{Arc, RwLock};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use tokio::time::Instant;
use unwatch_core::StatusSnapshot;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_CAP: Duration = Duration::from_secs(10 * 60);

/// Anything that can answer a status query without blocking the runner.
pub trait StatusSource: Send + Sync {
    fn status(&self) -> StatusSnapshot;
}

/// Shared, cloneable status cell published by the runner.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: StatusSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }
}

impl StatusSource for StatusHandle {
    fn status(&self) -> StatusSnapshot {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The task was observed not running.
    Finished { total: u64 },
    /// The cap elapsed first; the task may or may not have ended.
    PresumedComplete { last_total: u64 },
}

/// Poll `source` every `interval` until it reports idle or `cap` elapses.
pub async fn poll_until_idle<S: StatusSource + ?Sized>(
    source: &S,
    interval: Duration,
    cap: Duration,
) -> PollOutcome {
    let deadline = Instant::now() + cap;
    let mut last_total = 0;
    loop {
        let snapshot = source.status();
        if !snapshot.running {
            engine_info!("Task finished with {} removed", snapshot.total_processed);
            return PollOutcome::Finished {
                total: snapshot.total_processed,
            };
        }
        if snapshot.total_processed != last_total {
            engine_debug!("Progress: {} removed", snapshot.total_processed);
        }
        last_total = snapshot.total_processed;

        let now = Instant::now();
        if now >= deadline {
            engine_info!(
                "Stopped waiting after {:?}; presuming complete at {} removed",
                cap,
                last_total
            );
            return PollOutcome::PresumedComplete { last_total };
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
