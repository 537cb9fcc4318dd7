//! Routine sequencer
//!
//! Walks the `RoutinePlan` one phase at a time. At each phase entry the
//! screen is updated and the instruction enqueued, then the phase clock runs
//! for the configured duration. Progression never waits on narration except
//! for the final message, which must be heard before the run ends.
//!
//! Abort is observed only between phases.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use liftcue_types::RoutineConfig;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::clock::PhaseClock;
use super::position::{Phase, RoutinePlan, SequencerPosition};
use crate::narration::Narrator;
use crate::session::DisplaySink;
use crate::speech::SpeechQueue;

/// Counters for a finished or aborted run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Phase-clock ticks emitted
    pub ticks: u32,
    /// Phases fully executed
    pub phases: u32,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Stopped before entering `at`
    Aborted {
        at: SequencerPosition,
        summary: RunSummary,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed(summary) | RunOutcome::Aborted { summary, .. } => summary,
        }
    }
}

pub struct Sequencer {
    narrator: Narrator,
    queue: SpeechQueue,
    clock: PhaseClock,
    display: Arc<dyn DisplaySink>,
    set_pause: Duration,
}

impl Sequencer {
    pub fn new(
        config: Arc<RoutineConfig>,
        queue: SpeechQueue,
        display: Arc<dyn DisplaySink>,
    ) -> Self {
        let clock = PhaseClock::new(queue.clone(), config.count_direction);
        let set_pause = Duration::from_millis(config.set_pause_ms);
        Self {
            narrator: Narrator::new(config),
            queue,
            clock,
            display,
            set_pause,
        }
    }

    /// Run the whole routine, checking `abort` before every phase
    pub async fn run(&self, abort: &CancellationToken) -> RunOutcome {
        let started = Instant::now();
        let started_at = Local::now();
        let mut ticks = 0;
        let mut phases = 0;
        let summary = |ticks, phases| RunSummary {
            ticks,
            phases,
            started_at,
            elapsed: started.elapsed(),
        };

        for position in RoutinePlan::new(self.narrator.config()) {
            if abort.is_cancelled() {
                tracing::info!(
                    set = position.set_index,
                    phase = ?position.phase,
                    ticks,
                    "routine aborted"
                );
                return RunOutcome::Aborted {
                    at: position,
                    summary: summary(ticks, phases),
                };
            }

            tracing::debug!(
                set = position.set_index,
                side = ?position.side,
                rep = position.rep_index,
                phase = ?position.phase,
                "entering phase"
            );
            ticks = ticks.saturating_add(self.execute(position).await);
            phases += 1;
        }

        tracing::info!(ticks, phases, "routine complete");
        RunOutcome::Completed(summary(ticks, phases))
    }

    /// Execute one phase and return the ticks it emitted
    async fn execute(&self, position: SequencerPosition) -> u32 {
        let entry = self.narrator.entry(&position);
        self.display.show(&entry.display);
        let ticket = entry
            .spoken
            .map(|text| self.queue.enqueue(self.narrator.instruction(text)));

        match position.phase {
            Phase::SetTransition => {
                tokio::time::sleep(self.set_pause).await;
                0
            }
            Phase::Complete => {
                if let Some(ticket) = ticket {
                    let outcome = ticket.await;
                    tracing::debug!(?outcome, "final narration finished");
                }
                0
            }
            phase => {
                let seconds = phase.seconds(self.narrator.config());
                self.clock
                    .run(seconds, phase.is_counted(), |tick| {
                        let narration = self.narrator.tick(&position, tick);
                        self.display.show(&narration.display);
                        narration.spoken.map(|text| self.narrator.count(text))
                    })
                    .await
            }
        }
    }
}
