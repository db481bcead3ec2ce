use std::sync::Once;

use pretty_assertions::assert_eq;
use unwatch_core::{
    resume_if_eligible, update, Effect, ListingPolicy, Msg, Notice, PageOutcome, Phase,
    RunnerState, TaskCheckpoint, TaskError, TaskOutcome,
};

const LISTING: &str = "https://wiki.example.com/users/watches";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn new_state() -> RunnerState {
    RunnerState::new(ListingPolicy::parse(LISTING).unwrap())
}

fn started() -> RunnerState {
    let (state, _) = update(new_state(), Msg::StartRequested);
    state
}

fn processed(removed: u64, next: Option<&str>) -> Msg {
    Msg::PageProcessed {
        location: format!("{LISTING}?start=40"),
        outcome: PageOutcome {
            removed_count: removed,
            next_page: next.map(str::to_string),
        },
    }
}

#[test]
fn start_saves_fresh_checkpoint_before_processing() {
    init_logging();
    let (state, effects) = update(new_state(), Msg::StartRequested);

    assert_eq!(*state.phase(), Phase::Running);
    assert_eq!(state.checkpoint(), &TaskCheckpoint::fresh());
    assert_eq!(
        effects,
        vec![
            Effect::SaveCheckpoint(TaskCheckpoint::fresh()),
            Effect::Notify(Notice::Started),
            Effect::ProcessPage,
        ]
    );
}

#[test]
fn start_while_running_is_acknowledged_but_ignored() {
    init_logging();
    let running = started();
    let before = running.clone();
    let (after, effects) = update(running, Msg::StartRequested);
    assert_eq!(after, before);
    assert_eq!(effects, vec![Effect::Notify(Notice::AlreadyRunning)]);
}

#[test]
fn start_while_awaiting_reload_is_rejected() {
    init_logging();
    let (state, _) = update(started(), processed(2, Some(&format!("{LISTING}?start=60"))));
    let total_before = state.status().total_processed;

    let (state, effects) = update(state, Msg::StartRequested);
    assert_eq!(effects, vec![Effect::Notify(Notice::AlreadyRunning)]);
    assert_eq!(state.status().total_processed, total_before);
    assert!(state.status().running);
}

#[test]
fn page_without_next_control_completes_task() {
    init_logging();
    let (state, effects) = update(started(), processed(5, None));

    assert_eq!(*state.phase(), Phase::Idle);
    assert_eq!(state.checkpoint(), &TaskCheckpoint::inactive());
    assert_eq!(state.last_outcome(), Some(&TaskOutcome::Completed { total: 5 }));
    assert_eq!(state.status().total_processed, 5);
    assert!(!state.status().running);
    assert_eq!(
        effects,
        vec![
            Effect::ClearCheckpoint,
            Effect::Notify(Notice::Completed { total: 5 }),
        ]
    );
}

#[test]
fn zero_removed_with_next_page_terminates_without_navigation() {
    init_logging();
    let (state, effects) = update(started(), processed(0, Some(&format!("{LISTING}?start=60"))));

    assert_eq!(*state.phase(), Phase::Idle);
    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, Effect::NavigateTo { .. })));
    assert!(effects.contains(&Effect::ClearCheckpoint));
}

#[test]
fn resumed_page_with_next_link_saves_and_navigates() {
    init_logging();
    let stored = TaskCheckpoint {
        active: true,
        total_processed: 12,
        last_location: Some(format!("{LISTING}?start=20")),
    };
    let current = format!("{LISTING}?start=40");
    let (state, _, _) = resume_if_eligible(new_state(), stored, &current);

    let next = format!("{LISTING}?start=60");
    let (state, effects) = update(
        state,
        Msg::PageProcessed {
            location: current.clone(),
            outcome: PageOutcome {
                removed_count: 3,
                next_page: Some(next.clone()),
            },
        },
    );

    let expected = TaskCheckpoint {
        active: true,
        total_processed: 15,
        last_location: Some(current),
    };
    assert_eq!(state.checkpoint(), &expected);
    assert_eq!(
        *state.phase(),
        Phase::AwaitingReload {
            target: next.clone()
        }
    );
    assert_eq!(
        effects,
        vec![
            Effect::SaveCheckpoint(expected),
            Effect::Notify(Notice::Navigating {
                to: next.clone(),
                total: 15
            }),
            Effect::NavigateTo { location: next },
        ]
    );
}

#[test]
fn navigation_target_carries_automation_marker() {
    init_logging();
    let policy = ListingPolicy::parse(LISTING)
        .unwrap()
        .with_marker(unwatch_core::AutomationMarker::new("unwatch", "auto"));
    let (state, _) = update(RunnerState::new(policy), Msg::StartRequested);
    let (_, effects) = update(state, processed(1, Some(&format!("{LISTING}?start=20"))));

    assert!(effects.contains(&Effect::NavigateTo {
        location: format!("{LISTING}?start=20&unwatch=auto"),
    }));
}

#[test]
fn page_failure_aborts_and_clears() {
    init_logging();
    let (state, _) = update(started(), processed(2, Some(&format!("{LISTING}?start=20"))));
    // Awaiting reload ignores page failures.
    let (state, effects) = update(
        state,
        Msg::PageFailed {
            error: TaskError::UnexpectedPageShape("late".into()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.is_running());

    let error = TaskError::UnexpectedPageShape("listing container missing".into());
    let (state, effects) = update(started(), Msg::PageFailed { error: error.clone() });
    assert_eq!(*state.phase(), Phase::Idle);
    assert_eq!(state.checkpoint(), &TaskCheckpoint::inactive());
    assert_eq!(
        effects,
        vec![
            Effect::ClearCheckpoint,
            Effect::Notify(Notice::Aborted { total: 0, error }),
        ]
    );
}

#[test]
fn failed_navigation_aborts_with_last_total() {
    init_logging();
    let (state, _) = update(started(), processed(7, Some(&format!("{LISTING}?start=20"))));
    let error = TaskError::NavigationFailed("tab closed".into());
    let (state, effects) = update(state, Msg::NavigationFailed { error: error.clone() });

    assert_eq!(*state.phase(), Phase::Idle);
    assert_eq!(
        state.last_outcome(),
        Some(&TaskOutcome::Aborted {
            total: 7,
            error: error.clone()
        })
    );
    assert_eq!(
        effects,
        vec![
            Effect::ClearCheckpoint,
            Effect::Notify(Notice::Aborted { total: 7, error }),
        ]
    );
}

#[test]
fn page_processed_while_idle_is_ignored() {
    init_logging();
    let state = new_state();
    let (next, effects) = update(state.clone(), processed(3, None));
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn save_failure_before_navigation_aborts_with_page_total() {
    init_logging();
    let (state, _) = update(started(), processed(2, Some(&format!("{LISTING}?start=20"))));
    let error = TaskError::StorageUnavailable("storage disabled".into());
    let (state, effects) = update(state, Msg::CheckpointSaveFailed { error: error.clone() });

    assert!(!state.is_running());
    assert_eq!(state.status().total_processed, 2);
    assert_eq!(
        effects,
        vec![
            Effect::ClearCheckpoint,
            Effect::Notify(Notice::Aborted { total: 2, error }),
        ]
    );
}

#[test]
fn save_failure_at_start_keeps_processing_the_page() {
    init_logging();
    let error = TaskError::StorageUnavailable("storage disabled".into());
    let (state, effects) = update(started(), Msg::CheckpointSaveFailed { error });

    assert_eq!(*state.phase(), Phase::Running);
    assert_eq!(effects, vec![Effect::ClearCheckpoint]);
}
