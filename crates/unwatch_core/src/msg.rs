#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to start a fresh task.
    StartRequested,
    /// One pass over the current page finished.
    PageProcessed {
        location: String,
        outcome: crate::PageOutcome,
    },
    /// The current page could not be processed.
    PageFailed { error: crate::TaskError },
    /// The navigation layer refused the commanded navigation.
    NavigationFailed { error: crate::TaskError },
    /// Persisting the checkpoint failed.
    CheckpointSaveFailed { error: crate::TaskError },
    /// Fallback for placeholder wiring.
    NoOp,
}
