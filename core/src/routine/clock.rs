//! Phase clock
//!
//! Emits one tick per period for a fixed number of ticks. Each tick first
//! runs the caller's callback (display update) and then, when counting is
//! enabled, enqueues the returned utterance without waiting for it. Only the
//! period governs pace; speech never stretches or shortens a phase.

use std::time::Duration;

use liftcue_types::CountDirection;
use tokio::time::{Instant, interval_at};

use crate::speech::{SpeechQueue, SpeechRequest};

/// One unit of progress within a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1-based position of the tick within the phase
    pub index: u32,
    /// Value shown and spoken, per the count direction
    pub value: u32,
}

#[derive(Debug, Clone)]
pub struct PhaseClock {
    queue: SpeechQueue,
    direction: CountDirection,
    period: Duration,
}

impl PhaseClock {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub fn new(queue: SpeechQueue, direction: CountDirection) -> Self {
        Self {
            queue,
            direction,
            period: Self::DEFAULT_PERIOD,
        }
    }

    /// Run `seconds` ticks and return the number emitted.
    ///
    /// Resolves one full period after the last tick; `seconds == 0` resolves
    /// at once. Not cancellable mid-phase.
    pub async fn run<F>(&self, seconds: u32, counting: bool, mut on_tick: F) -> u32
    where
        F: FnMut(Tick) -> Option<SpeechRequest>,
    {
        if seconds == 0 {
            return 0;
        }

        let mut interval = interval_at(Instant::now(), self.period);
        for index in 1..=seconds {
            interval.tick().await;
            let tick = Tick {
                index,
                value: self.direction.value(index, seconds),
            };
            tracing::trace!(index, value = tick.value, "phase tick");

            let count = on_tick(tick);
            if counting {
                if let Some(request) = count {
                    // Fire and forget: the clock never waits on speech
                    drop(self.queue.enqueue(request));
                }
            }
        }
        interval.tick().await;

        seconds
    }
}
