use crate::{AbandonReason, ListingPolicy, TaskCheckpoint, TaskError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    /// Navigation was commanded; this instance does nothing further.
    AwaitingReload { target: String },
}

/// How the most recent task of this instance ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed { total: u64 },
    Aborted { total: u64, error: TaskError },
    /// A stored task was dropped on load; `total` is what it had reached.
    Abandoned { total: u64, reason: AbandonReason },
}

/// Read-only view answered to status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub running: bool,
    pub total_processed: u64,
}

/// Runner state of a single page load. Rebuilt from the checkpoint store on
/// every load; never shared between loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerState {
    policy: ListingPolicy,
    phase: Phase,
    checkpoint: TaskCheckpoint,
    last_outcome: Option<TaskOutcome>,
}

impl RunnerState {
    pub fn new(policy: ListingPolicy) -> Self {
        Self {
            policy,
            phase: Phase::Idle,
            checkpoint: TaskCheckpoint::inactive(),
            last_outcome: None,
        }
    }

    pub fn policy(&self) -> &ListingPolicy {
        &self.policy
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn checkpoint(&self) -> &TaskCheckpoint {
        &self.checkpoint
    }

    pub fn last_outcome(&self) -> Option<&TaskOutcome> {
        self.last_outcome.as_ref()
    }

    /// Any phase other than idle holds the single-flight guard.
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn status(&self) -> StatusSnapshot {
        let total_processed = if self.checkpoint.active {
            self.checkpoint.total_processed
        } else {
            match &self.last_outcome {
                Some(
                    TaskOutcome::Completed { total }
                    | TaskOutcome::Aborted { total, .. }
                    | TaskOutcome::Abandoned { total, .. },
                ) => *total,
                None => 0,
            }
        };
        StatusSnapshot {
            running: self.is_running(),
            total_processed,
        }
    }

    pub(crate) fn begin(&mut self, checkpoint: TaskCheckpoint) {
        self.phase = Phase::Running;
        self.checkpoint = checkpoint;
        self.last_outcome = None;
    }

    pub(crate) fn record_page(&mut self, removed: u64) {
        self.checkpoint.record_page(removed);
    }

    pub(crate) fn await_reload(&mut self, from: String, target: String) {
        self.checkpoint.last_location = Some(from);
        self.phase = Phase::AwaitingReload { target };
    }

    pub(crate) fn finish(&mut self, outcome: TaskOutcome) {
        self.phase = Phase::Idle;
        self.checkpoint = TaskCheckpoint::inactive();
        self.last_outcome = Some(outcome);
    }
}
