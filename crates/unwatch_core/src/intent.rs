//! Best-effort classification of a page load as automation-driven or manual.
//!
//! Both kinds of navigation look identical from inside the page, so the
//! decision rests on the pagination cursor having advanced since the runner
//! last navigated. Listings whose cursor is not monotonic can be misclassified.

use std::fmt;

use url::Url;

use crate::{ListingPolicy, TaskCheckpoint, TaskError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    /// No task was in progress.
    NoTask,
    /// The load continues the recorded task.
    Automated,
    /// The load looks like a human navigation; the task must be dropped.
    Manual(AbandonReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    NotListing { location: String },
    UnparsableLocation { location: String },
    MissingMarker,
    MissingLastLocation,
    CursorNotAdvanced { previous: u64, current: u64 },
    PageNotReady,
}

impl AbandonReason {
    pub fn to_error(&self) -> TaskError {
        match self {
            AbandonReason::PageNotReady => TaskError::UnexpectedPageShape(self.to_string()),
            _ => TaskError::NavigationAmbiguous(self.to_string()),
        }
    }
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::NotListing { location } => {
                write!(f, "{location} is not the listing page")
            }
            AbandonReason::UnparsableLocation { location } => {
                write!(f, "location {location:?} could not be parsed")
            }
            AbandonReason::MissingMarker => write!(f, "automation marker missing"),
            AbandonReason::MissingLastLocation => {
                write!(f, "no previous location recorded")
            }
            AbandonReason::CursorNotAdvanced { previous, current } => {
                write!(f, "cursor did not advance ({previous} -> {current})")
            }
            AbandonReason::PageNotReady => write!(f, "page did not become ready"),
        }
    }
}

/// Decide whether `current` continues the task recorded in `checkpoint`.
///
/// A location without a cursor is the first page and reads as cursor 0.
pub fn classify_navigation(
    checkpoint: &TaskCheckpoint,
    current: &str,
    policy: &ListingPolicy,
) -> NavigationIntent {
    if !checkpoint.active {
        return NavigationIntent::NoTask;
    }

    let Ok(current_url) = Url::parse(current) else {
        return NavigationIntent::Manual(AbandonReason::UnparsableLocation {
            location: current.to_string(),
        });
    };
    if !policy.is_listing(&current_url) {
        return NavigationIntent::Manual(AbandonReason::NotListing {
            location: current.to_string(),
        });
    }
    if !policy.has_marker(&current_url) {
        return NavigationIntent::Manual(AbandonReason::MissingMarker);
    }

    // An active task that never navigated means this page was reloaded
    // mid-pass.
    let Some(last) = checkpoint.last_location.as_deref() else {
        return NavigationIntent::Manual(AbandonReason::MissingLastLocation);
    };
    let Ok(last_url) = Url::parse(last) else {
        return NavigationIntent::Manual(AbandonReason::UnparsableLocation {
            location: last.to_string(),
        });
    };

    let previous = policy.pagination_cursor(&last_url).unwrap_or(0);
    let current = policy.pagination_cursor(&current_url).unwrap_or(0);
    if current > previous {
        NavigationIntent::Automated
    } else {
        NavigationIntent::Manual(AbandonReason::CursorNotAdvanced { previous, current })
    }
}
