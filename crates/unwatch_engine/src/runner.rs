//! Effect executor for one page load.
//!
//! A `TaskRunner` lives exactly as long as the page it was built for. It owns
//! the pure `RunnerState`, feeds it messages, and carries out the effects the
//! state machine asks for against the checkpoint store, the page adapter and
//! the navigator. Removals run strictly one after another with a settle delay
//! in between. Commands from other tasks arrive through a [`RunnerHandle`]
//! and are answered between removals.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::sync::{mpsc, oneshot};
use unwatch_core::{
    abandon, resume_if_eligible, update, AbandonReason, Effect, ListingPolicy, Msg, Notice,
    PageOutcome, Phase, ResumeOutcome, RunnerState, StatusSnapshot, TaskCheckpoint, TaskError,
    TaskOutcome,
};

use crate::{
    CheckpointStore, LogNoticeSink, NavigationError, NoticeSink, PageAdapter, PageReady,
    StatusHandle, StatusSource,
};

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Pause after each removal so the host page can settle.
    pub settle_delay: Duration,
    /// Upper bound on waiting for the page-ready signal.
    pub ready_timeout: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(800),
            ready_timeout: Duration::from_secs(10),
        }
    }
}

/// Carries out navigation to another listing page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str) -> Result<(), NavigationError>;
}

/// Navigator that records the requested location for the hosting loop.
#[derive(Debug, Clone, Default)]
pub struct PendingNavigation {
    target: Arc<Mutex<Option<String>>>,
}

impl PendingNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<String> {
        self.target.lock().ok().and_then(|mut target| target.take())
    }
}

impl Navigator for PendingNavigation {
    fn navigate(&self, location: &str) -> Result<(), NavigationError> {
        let mut target = self.target.lock().map_err(|_| NavigationError {
            location: location.to_string(),
            message: "navigation slot poisoned".into(),
        })?;
        *target = Some(location.to_string());
        Ok(())
    }
}

/// Acknowledgement returned by [`TaskRunner::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAck {
    Started,
    AlreadyRunning,
}

/// Where this instance's work ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    Idle,
    Completed { total: u64 },
    Aborted { total: u64, error: TaskError },
    /// A stored task was not continued on this load.
    Abandoned { total: u64, error: TaskError },
    /// Navigation was issued; a new instance continues on the target page.
    Navigated { to: String },
}

#[derive(Debug)]
enum RunnerCommand {
    Start { reply: oneshot::Sender<StartAck> },
}

/// Cloneable command surface of one runner instance.
///
/// Commands are answered while [`TaskRunner::run_pending`] executes, so a
/// start sent mid-pass is rejected rather than queued behind the pass.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    commands: mpsc::UnboundedSender<RunnerCommand>,
    status: StatusHandle,
}

impl RunnerHandle {
    /// Request a fresh task. `None` once the runner instance is gone.
    pub async fn start(&self) -> Option<StartAck> {
        let (reply, ack) = oneshot::channel();
        self.commands.send(RunnerCommand::Start { reply }).ok()?;
        ack.await.ok()
    }
}

impl StatusSource for RunnerHandle {
    fn status(&self) -> StatusSnapshot {
        self.status.status()
    }
}

pub struct TaskRunner<S, P, N> {
    state: RunnerState,
    store: S,
    page: P,
    navigator: N,
    settings: RunnerSettings,
    notices: Arc<dyn NoticeSink>,
    status: StatusHandle,
    pending: VecDeque<Effect>,
    commands: mpsc::UnboundedReceiver<RunnerCommand>,
    command_tx: mpsc::UnboundedSender<RunnerCommand>,
}

impl<S, P, N> TaskRunner<S, P, N>
where
    S: CheckpointStore,
    P: PageAdapter,
    N: Navigator,
{
    pub fn new(
        store: S,
        page: P,
        navigator: N,
        policy: ListingPolicy,
        settings: RunnerSettings,
    ) -> Self {
        let (command_tx, commands) = mpsc::unbounded_channel();
        Self {
            state: RunnerState::new(policy),
            store,
            page,
            navigator,
            settings,
            notices: Arc::new(LogNoticeSink),
            status: StatusHandle::new(),
            pending: VecDeque::new(),
            commands,
            command_tx,
        }
    }

    pub fn with_notice_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    /// Publish status into an existing handle, e.g. one shared by every page
    /// load of the same tab.
    pub fn with_status_handle(mut self, handle: StatusHandle) -> Self {
        self.status = handle;
        self
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    pub fn status(&self) -> StatusSnapshot {
        self.state.status()
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Handle for other tasks. Take it after [`TaskRunner::with_status_handle`].
    pub fn handle(&self) -> RunnerHandle {
        RunnerHandle {
            commands: self.command_tx.clone(),
            status: self.status.clone(),
        }
    }

    /// Run once at start-up: continue a stored task if this load looks like
    /// the runner's own navigation, drop it otherwise.
    pub async fn resume_if_eligible(&mut self, ready: PageReady) -> ResumeOutcome {
        let stored = self.load_checkpoint();
        if !stored.active {
            return ResumeOutcome::Idle;
        }

        if !ready.wait(self.settings.ready_timeout).await {
            engine_warn!(
                "Page not ready within {:?}; dropping stored task",
                self.settings.ready_timeout
            );
            let reason = AbandonReason::PageNotReady;
            let (state, effects) = abandon(self.state.clone(), stored, reason.clone());
            self.state = state;
            self.pending.extend(effects);
            self.flush_immediate();
            return ResumeOutcome::Abandoned(reason);
        }

        let location = self.page.current_listing_location();
        let (state, outcome, effects) = resume_if_eligible(self.state.clone(), stored, &location);
        self.state = state;
        self.pending.extend(effects);
        self.flush_immediate();

        match &outcome {
            ResumeOutcome::Resumed { total } => {
                engine_info!("Resuming on {} from {} removed", location, total)
            }
            ResumeOutcome::Abandoned(reason) => {
                engine_info!("Not resuming on {}: {}", location, reason)
            }
            ResumeOutcome::Idle => {}
        }
        outcome
    }

    /// Begin a fresh task. Returns at once; the work happens in
    /// [`TaskRunner::run_pending`].
    pub fn start(&mut self) -> StartAck {
        let ack = if self.state.is_running() {
            StartAck::AlreadyRunning
        } else {
            StartAck::Started
        };
        self.dispatch(Msg::StartRequested);
        self.flush_immediate();
        ack
    }

    /// Execute queued effects until this instance has nothing left to do.
    pub async fn run_pending(&mut self) -> RunEnd {
        loop {
            self.answer_queued_commands();
            let Some(effect) = self.pending.pop_front() else {
                break;
            };
            match effect {
                Effect::ProcessPage => {
                    let msg = self.process_page().await;
                    self.dispatch(msg);
                }
                Effect::NavigateTo { location } => {
                    engine_info!("Navigating to {}", location);
                    if let Err(err) = self.navigator.navigate(&location) {
                        self.dispatch(Msg::NavigationFailed {
                            error: TaskError::NavigationFailed(err.to_string()),
                        });
                    }
                }
                other => self.execute(other),
            }
        }
        self.publish_status();
        self.run_end()
    }

    fn run_end(&self) -> RunEnd {
        match (self.state.phase(), self.state.last_outcome()) {
            (Phase::AwaitingReload { target }, _) => RunEnd::Navigated { to: target.clone() },
            (Phase::Idle, Some(TaskOutcome::Completed { total })) => {
                RunEnd::Completed { total: *total }
            }
            (Phase::Idle, Some(TaskOutcome::Aborted { total, error })) => RunEnd::Aborted {
                total: *total,
                error: error.clone(),
            },
            (Phase::Idle, Some(TaskOutcome::Abandoned { total, reason })) => RunEnd::Abandoned {
                total: *total,
                error: reason.to_error(),
            },
            _ => RunEnd::Idle,
        }
    }

    async fn process_page(&mut self) -> Msg {
        let location = self.page.current_listing_location();
        let items = match self.page.items_on_page().await {
            Ok(items) => items,
            Err(err) => {
                return Msg::PageFailed {
                    error: TaskError::UnexpectedPageShape(err.to_string()),
                }
            }
        };

        engine_info!("Found {} removable items on {}", items.len(), location);
        let base = self.state.checkpoint().total_processed;
        let mut removed = 0u64;
        for item in &items {
            engine_debug!(
                "Removing item {}/{}: {} ({})",
                item.index + 1,
                items.len(),
                item.label.as_deref().unwrap_or("unlabelled"),
                item.target
            );
            if self.page.remove_item(item).await {
                removed += 1;
                self.status.publish(StatusSnapshot {
                    running: true,
                    total_processed: base + removed,
                });
            } else {
                engine_warn!("{}", TaskError::ItemRemovalFailed(item.target.clone()));
            }
            self.settle().await;
        }

        let next_page = self.page.next_page_location();
        engine_info!(
            "Removed {} of {} items on {} (total {})",
            removed,
            items.len(),
            location,
            base + removed
        );
        Msg::PageProcessed {
            location,
            outcome: PageOutcome {
                removed_count: removed,
                next_page,
            },
        }
    }

    /// Wait out the settle delay while answering commands.
    async fn settle(&mut self) {
        let sleep = tokio::time::sleep(self.settings.settle_delay);
        tokio::pin!(sleep);
        loop {
            let command = tokio::select! {
                biased;
                command = self.commands.recv() => command,
                () = &mut sleep => None,
            };
            match command {
                Some(command) => self.answer(command),
                None => break,
            }
        }
    }

    fn answer_queued_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.answer(command);
        }
    }

    fn answer(&mut self, command: RunnerCommand) {
        match command {
            RunnerCommand::Start { reply } => {
                let ack = self.start();
                // The requester may have stopped waiting.
                let _ = reply.send(ack);
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let (state, effects) = update(self.state.clone(), msg);
        self.state = state;
        self.pending.extend(effects);
        self.publish_status();
    }

    /// Execute leading effects that need no page interaction.
    fn flush_immediate(&mut self) {
        while let Some(effect) = self.pending.front() {
            if matches!(effect, Effect::ProcessPage | Effect::NavigateTo { .. }) {
                break;
            }
            if let Some(effect) = self.pending.pop_front() {
                self.execute(effect);
            }
        }
        self.publish_status();
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::SaveCheckpoint(checkpoint) => self.save_checkpoint(&checkpoint),
            Effect::ClearCheckpoint => self.clear_checkpoint(),
            Effect::Notify(notice) => self.notices.emit(notice),
            // Page effects only run from `run_pending`.
            Effect::ProcessPage | Effect::NavigateTo { .. } => {
                self.pending.push_front(effect);
            }
        }
    }

    fn load_checkpoint(&self) -> TaskCheckpoint {
        self.store.load().unwrap_or_else(|err| {
            engine_warn!("{}", TaskError::from(err));
            TaskCheckpoint::inactive()
        })
    }

    fn save_checkpoint(&mut self, checkpoint: &TaskCheckpoint) {
        let Err(err) = self.store.save(checkpoint) else {
            return;
        };
        let error = TaskError::from(err);
        engine_warn!("{}", error);
        if matches!(self.state.phase(), Phase::AwaitingReload { .. }) {
            // Without the saved location the next load cannot continue.
            self.pending.retain(|effect| {
                !matches!(
                    effect,
                    Effect::NavigateTo { .. } | Effect::Notify(Notice::Navigating { .. })
                )
            });
        }
        self.dispatch(Msg::CheckpointSaveFailed { error });
    }

    fn clear_checkpoint(&self) {
        if let Err(err) = self.store.clear() {
            engine_warn!("{}", TaskError::from(err));
        }
    }

    fn publish_status(&self) {
        self.status.publish(self.state.status());
    }
}
