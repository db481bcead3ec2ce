use serde::{Deserialize, Serialize};

/// Stable key names of the persisted checkpoint fields.
pub const KEY_ACTIVE: &str = "active";
pub const KEY_TOTAL_PROCESSED: &str = "totalProcessed";
pub const KEY_LAST_LOCATION: &str = "lastLocation";

/// Durable record of an in-progress task.
///
/// An inactive checkpoint never carries a count or a location; use
/// [`TaskCheckpoint::normalized`] before persisting values of unknown origin.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCheckpoint {
    pub active: bool,
    pub total_processed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_location: Option<String>,
}

impl TaskCheckpoint {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Checkpoint saved when a task is explicitly started.
    pub fn fresh() -> Self {
        Self {
            active: true,
            total_processed: 0,
            last_location: None,
        }
    }

    pub fn normalized(self) -> Self {
        if self.active {
            self
        } else {
            Self::inactive()
        }
    }

    pub(crate) fn record_page(&mut self, removed: u64) {
        self.total_processed = self.total_processed.saturating_add(removed);
    }
}

/// Result of one processing pass over a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageOutcome {
    pub removed_count: u64,
    /// Location of the next listing page, absent when the next-page control
    /// is missing or disabled.
    pub next_page: Option<String>,
}

impl PageOutcome {
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }

    /// A pass that removed nothing, or has nowhere to go, ends the task.
    pub fn is_terminal(&self) -> bool {
        self.removed_count == 0 || !self.has_next_page()
    }
}
