use crate::{
    classify_navigation, AbandonReason, Effect, NavigationIntent, Notice, RunnerState,
    TaskCheckpoint, TaskOutcome,
};

/// Result of the start-up resume check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    Resumed { total: u64 },
    Idle,
    Abandoned(AbandonReason),
}

/// Decide, once per page load, whether the stored checkpoint continues here.
///
/// `stored` is what the checkpoint store returned; an instance that is already
/// running ignores the check.
pub fn resume_if_eligible(
    mut state: RunnerState,
    stored: TaskCheckpoint,
    location: &str,
) -> (RunnerState, ResumeOutcome, Vec<Effect>) {
    if state.is_running() {
        return (state, ResumeOutcome::Idle, Vec::new());
    }

    let stored = stored.normalized();
    match classify_navigation(&stored, location, state.policy()) {
        NavigationIntent::NoTask => (state, ResumeOutcome::Idle, Vec::new()),
        NavigationIntent::Automated => {
            let total = stored.total_processed;
            state.begin(stored);
            (
                state,
                ResumeOutcome::Resumed { total },
                vec![
                    Effect::Notify(Notice::Resumed { total }),
                    Effect::ProcessPage,
                ],
            )
        }
        NavigationIntent::Manual(reason) => {
            let effects = abandon_effects(&mut state, stored.total_processed, reason.clone());
            (state, ResumeOutcome::Abandoned(reason), effects)
        }
    }
}

/// Drop a stored task without evaluating the location, e.g. when the page
/// never became ready.
pub fn abandon(
    mut state: RunnerState,
    stored: TaskCheckpoint,
    reason: AbandonReason,
) -> (RunnerState, Vec<Effect>) {
    if state.is_running() {
        return (state, Vec::new());
    }
    let total = stored.normalized().total_processed;
    let effects = abandon_effects(&mut state, total, reason);
    (state, effects)
}

fn abandon_effects(state: &mut RunnerState, total: u64, reason: AbandonReason) -> Vec<Effect> {
    state.finish(TaskOutcome::Abandoned {
        total,
        reason: reason.clone(),
    });
    vec![
        Effect::ClearCheckpoint,
        Effect::Notify(Notice::Abandoned { total, reason }),
    ]
}
