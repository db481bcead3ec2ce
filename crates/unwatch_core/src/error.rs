use thiserror::Error;

/// Failures that end (or degrade) a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("checkpoint storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("item removal failed: {0}")]
    ItemRemovalFailed(String),
    #[error("navigation could not be confirmed as automated: {0}")]
    NavigationAmbiguous(String),
    #[error("unexpected page shape: {0}")]
    UnexpectedPageShape(String),
    #[error("navigation to the next page failed: {0}")]
    NavigationFailed(String),
}
