//! Session controller
//!
//! `start_session` is the only entry point for a run:
//! 1. Acquire the run guard (a second start while held is a silent no-op)
//! 2. Disable the trigger and spawn the sequencer
//! 3. On any exit (completion, abort, panic): flush the speech queue,
//!    re-enable the trigger, release the guard. This runs inside the
//!    spawned task, so it happens even if the caller stops waiting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use liftcue_types::RoutineConfig;
use tokio_util::sync::CancellationToken;

use super::guard::RunGuard;
use super::sink::{DisplaySink, Trigger, TriggerState};
use crate::narration::Narrator;
use crate::routine::{RunOutcome, RunSummary, Sequencer, SequencerPosition};
use crate::speech::{QueueStatus, SpeechQueue};

/// Result of one `start_session` call
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// A run was already active; nothing happened
    Refused,
    Completed(RunSummary),
    Aborted {
        at: SequencerPosition,
        summary: RunSummary,
    },
    /// The sequencer task panicked; teardown still ran
    Failed { reason: String },
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Refused => "refused",
            SessionOutcome::Completed(_) => "completed",
            SessionOutcome::Aborted { .. } => "aborted",
            SessionOutcome::Failed { .. } => "failed",
        }
    }
}

impl From<RunOutcome> for SessionOutcome {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed(summary) => SessionOutcome::Completed(summary),
            RunOutcome::Aborted { at, summary } => SessionOutcome::Aborted { at, summary },
        }
    }
}

pub struct Session {
    shared: Arc<Shared>,
    guard: RunGuard,
}

/// Everything the run task needs to finish and tear down on its own
struct Shared {
    config: Arc<RoutineConfig>,
    narrator: Narrator,
    queue: SpeechQueue,
    display: Arc<dyn DisplaySink>,
    trigger: Arc<dyn Trigger>,
    /// Abort signal of the active run
    abort: Mutex<Option<CancellationToken>>,
}

impl Session {
    /// Build a controller and show the idle screen
    pub fn new(
        config: RoutineConfig,
        queue: SpeechQueue,
        display: Arc<dyn DisplaySink>,
        trigger: Arc<dyn Trigger>,
    ) -> Self {
        let config = Arc::new(config);
        let narrator = Narrator::new(Arc::clone(&config));
        let shared = Shared {
            config,
            narrator,
            queue,
            display,
            trigger,
            abort: Mutex::new(None),
        };
        shared.display.show(&shared.narrator.idle());
        shared.set_trigger(TriggerState::Ready);
        Self {
            shared: Arc::new(shared),
            guard: RunGuard::new(),
        }
    }

    /// Share a guard with other controllers so only one of them runs at a time
    pub fn with_guard(mut self, guard: RunGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn config(&self) -> &RoutineConfig {
        &self.shared.config
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_held()
    }

    pub async fn queue_status(&self) -> QueueStatus {
        self.shared.queue.status().await
    }

    /// Ask the active run to stop at the next phase boundary.
    ///
    /// Returns false when no run is active.
    pub fn abort(&self) -> bool {
        match self.shared.abort_slot().as_ref() {
            Some(token) => {
                token.cancel();
                tracing::info!("session abort requested");
                true
            }
            None => false,
        }
    }

    /// Run one session to its end. Refused (no-op) while another run holds
    /// the guard.
    ///
    /// The run and its teardown live in a spawned task that owns the guard
    /// permit. Dropping this future aborts the run at the next phase
    /// boundary; the guard stays held until that task has torn down.
    pub async fn start_session(&self) -> SessionOutcome {
        let Some(permit) = self.guard.try_acquire() else {
            tracing::debug!("start ignored, a session is already running");
            return SessionOutcome::Refused;
        };

        let token = CancellationToken::new();
        *self.shared.abort_slot() = Some(token.clone());
        let _abort_on_drop = token.clone().drop_guard();

        self.shared.set_trigger(TriggerState::Running);
        tracing::info!(
            sets = self.shared.config.sets,
            reps_per_side = self.shared.config.reps_per_side,
            total_ticks = self.shared.config.total_ticks(),
            voice = !self.shared.queue.is_silent(),
            language = self.shared.config.language_tag(),
            "session started"
        );

        let shared = Arc::clone(&self.shared);
        let run = tokio::spawn(async move {
            let outcome = shared.run(token).await;
            let abandoned = shared.teardown(&outcome).await;
            // Released last so a new run never shares the queue with this
            // one's leftovers
            drop(permit);
            tracing::info!(outcome = outcome.label(), abandoned, "session finished");
            outcome
        });

        match run.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "session task failed");
                SessionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl Shared {
    /// Drive the sequencer in its own task so a panic is reported, not
    /// propagated
    async fn run(&self, token: CancellationToken) -> SessionOutcome {
        let sequencer = Sequencer::new(
            Arc::clone(&self.config),
            self.queue.clone(),
            Arc::clone(&self.display),
        );
        let run = tokio::spawn(async move { sequencer.run(&token).await });

        match run.await {
            Ok(outcome) => SessionOutcome::from(outcome),
            Err(e) => {
                let reason = if e.is_panic() {
                    panic_message(e.into_panic())
                } else {
                    e.to_string()
                };
                tracing::error!(%reason, "sequencer task failed");
                SessionOutcome::Failed { reason }
            }
        }
    }

    /// Flush speech, clear the abort slot and re-enable the trigger.
    /// Returns the number of abandoned utterances.
    async fn teardown(&self, outcome: &SessionOutcome) -> usize {
        let abandoned = self.queue.flush().await;
        *self.abort_slot() = None;
        // Only a finished routine offers "start again"
        let state = match outcome {
            SessionOutcome::Completed(_) => TriggerState::Finished,
            _ => TriggerState::Ready,
        };
        self.set_trigger(state);
        abandoned
    }

    fn set_trigger(&self, state: TriggerState) {
        self.trigger
            .update(state, self.narrator.trigger_label(state));
    }

    fn abort_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.abort.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "sequencer panicked".to_string()
    }
}
