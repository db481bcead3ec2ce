use crate::{AbandonReason, TaskCheckpoint, TaskError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveCheckpoint(TaskCheckpoint),
    ClearCheckpoint,
    /// Run one removal pass over the current page.
    ProcessPage,
    NavigateTo { location: String },
    Notify(Notice),
}

/// User-facing progress and results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Started,
    AlreadyRunning,
    Resumed { total: u64 },
    Abandoned { total: u64, reason: AbandonReason },
    Navigating { to: String, total: u64 },
    Completed { total: u64 },
    Aborted { total: u64, error: TaskError },
}
