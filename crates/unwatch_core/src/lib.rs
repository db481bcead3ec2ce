//! Unwatch core: pure state machine for the resumable cross-navigation task.
mod checkpoint;
mod effect;
mod error;
mod intent;
mod msg;
mod policy;
mod resume;
mod state;
mod update;

pub use checkpoint::{
    PageOutcome, TaskCheckpoint, KEY_ACTIVE, KEY_LAST_LOCATION, KEY_TOTAL_PROCESSED,
};
pub use effect::{Effect, Notice};
pub use error::TaskError;
pub use intent::{classify_navigation, AbandonReason, NavigationIntent};
pub use msg::Msg;
pub use policy::{AutomationMarker, ListingPolicy, DEFAULT_CURSOR_PARAM};
pub use resume::{abandon, resume_if_eligible, ResumeOutcome};
pub use state::{Phase, RunnerState, StatusSnapshot, TaskOutcome};
pub use update::update;
