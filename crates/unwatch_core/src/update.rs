use crate::{Effect, Msg, Notice, Phase, RunnerState, TaskCheckpoint, TaskOutcome};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: RunnerState, msg: Msg) -> (RunnerState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested => {
            if state.is_running() {
                return (state, vec![Effect::Notify(Notice::AlreadyRunning)]);
            }
            let checkpoint = TaskCheckpoint::fresh();
            state.begin(checkpoint.clone());
            vec![
                Effect::SaveCheckpoint(checkpoint),
                Effect::Notify(Notice::Started),
                Effect::ProcessPage,
            ]
        }
        Msg::PageProcessed { location, outcome } => {
            if *state.phase() != Phase::Running {
                return (state, Vec::new());
            }
            state.record_page(outcome.removed_count);
            let total = state.checkpoint().total_processed;

            match outcome.next_page {
                Some(next) if outcome.removed_count > 0 => {
                    let target = state.policy().mark(&next);
                    state.await_reload(location, target.clone());
                    // Saved before navigating so a reload loses at most this page.
                    vec![
                        Effect::SaveCheckpoint(state.checkpoint().clone()),
                        Effect::Notify(Notice::Navigating {
                            to: target.clone(),
                            total,
                        }),
                        Effect::NavigateTo { location: target },
                    ]
                }
                _ => {
                    state.finish(TaskOutcome::Completed { total });
                    vec![
                        Effect::ClearCheckpoint,
                        Effect::Notify(Notice::Completed { total }),
                    ]
                }
            }
        }
        Msg::PageFailed { error } => {
            if *state.phase() != Phase::Running {
                return (state, Vec::new());
            }
            abort(&mut state, error)
        }
        Msg::NavigationFailed { error } => {
            if !matches!(state.phase(), Phase::AwaitingReload { .. }) {
                return (state, Vec::new());
            }
            abort(&mut state, error)
        }
        Msg::CheckpointSaveFailed { error } => {
            if matches!(state.phase(), Phase::AwaitingReload { .. }) {
                // The next load could not tell where the task left off.
                abort(&mut state, error)
            } else if state.is_running() {
                // The current page still gets processed; only resuming is lost.
                vec![Effect::ClearCheckpoint]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn abort(state: &mut RunnerState, error: crate::TaskError) -> Vec<Effect> {
    let total = state.checkpoint().total_processed;
    state.finish(TaskOutcome::Aborted {
        total,
        error: error.clone(),
    });
    vec![
        Effect::ClearCheckpoint,
        Effect::Notify(Notice::Aborted { total, error }),
    ]
}
