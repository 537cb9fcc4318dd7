//! Narration content
//!
//! Pure mapping from a routine position (and optionally a tick) to the three
//! display lines and the text to speak. Nothing here performs I/O; the
//! sequencer decides what to show and what to enqueue.

mod phrasebook;

use std::sync::Arc;

use liftcue_types::RoutineConfig;

pub use phrasebook::{Phrasebook, fill, lookup};

use crate::routine::{Phase, SequencerPosition, Side, Tick};
use crate::session::TriggerState;
use crate::speech::SpeechRequest;

/// Three independent lines of the on-screen readout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayLines {
    pub action: String,
    pub progress: String,
    pub detail: String,
}

impl DisplayLines {
    pub fn new(
        action: impl Into<String>,
        progress: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            progress: progress.into(),
            detail: detail.into(),
        }
    }
}

/// Generated content for one moment of the routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub display: DisplayLines,
    /// `None` when nothing should be spoken (uncounted ticks)
    pub spoken: Option<String>,
}

/// Content for `position`.
///
/// With `tick == None` this is the phase entry: the instruction is spoken
/// and the detail line shows the first tick value (empty when the phase has
/// no ticks). With a tick, the detail shows its value and the count is
/// spoken only for counted phases.
pub fn narrate(
    config: &RoutineConfig,
    position: &SequencerPosition,
    tick: Option<Tick>,
) -> Narration {
    let book = lookup(config.language_tag());
    let set = position.set_index.to_string();
    let side = match position.side {
        Side::Left => book.left,
        Side::Right => book.right,
    };
    let progress = fill(
        book.progress,
        &[
            ("set", set.clone()),
            ("sets", config.sets.to_string()),
            ("rep", position.rep_index.to_string()),
            ("reps", config.reps_per_side.to_string()),
        ],
    );

    let action = match position.phase {
        Phase::Posture => book.posture.to_string(),
        Phase::Prep => fill(book.prep, &[("set", set.clone())]),
        Phase::Lift => fill(book.lift, &[("side", side.to_string())]),
        Phase::Lower => fill(book.lower, &[("side", side.to_string())]),
        Phase::SetTransition => {
            let next = (position.set_index + 1).to_string();
            return Narration {
                display: DisplayLines::new(
                    fill(book.set_done, &[("set", set.clone())]),
                    "",
                    fill(book.set_next, &[("next", next.clone())]),
                ),
                spoken: Some(fill(
                    book.set_transition_spoken,
                    &[("set", set), ("next", next)],
                )),
            };
        }
        Phase::Complete => {
            return Narration {
                display: DisplayLines::new(book.finish, "", book.finish_detail),
                spoken: Some(book.finish_spoken.to_string()),
            };
        }
    };

    // Only rep phases carry the set/rep progress line
    let progress = match position.phase {
        Phase::Lift | Phase::Lower => progress,
        _ => String::new(),
    };
    let seconds = |n: u32| fill(book.seconds, &[("n", n.to_string())]);

    match tick {
        None => {
            let total = position.phase.seconds(config);
            let detail = if total == 0 {
                String::new()
            } else {
                seconds(config.count_direction.value(1, total))
            };
            Narration {
                display: DisplayLines::new(action.clone(), progress, detail),
                spoken: Some(action),
            }
        }
        Some(tick) => Narration {
            display: DisplayLines::new(action, progress, seconds(tick.value)),
            spoken: position
                .phase
                .is_counted()
                .then(|| book.count_word(tick.value)),
        },
    }
}

/// Binds a routine config to the generator and builds speech requests with
/// the configured voice.
#[derive(Debug, Clone)]
pub struct Narrator {
    config: Arc<RoutineConfig>,
    book: &'static Phrasebook,
}

impl Narrator {
    pub fn new(config: Arc<RoutineConfig>) -> Self {
        let book = lookup(config.language_tag());
        Self { config, book }
    }

    pub fn config(&self) -> &RoutineConfig {
        &self.config
    }

    pub fn entry(&self, position: &SequencerPosition) -> Narration {
        narrate(&self.config, position, None)
    }

    pub fn tick(&self, position: &SequencerPosition, tick: Tick) -> Narration {
        narrate(&self.config, position, Some(tick))
    }

    /// Screen shown before any session has started
    pub fn idle(&self) -> DisplayLines {
        DisplayLines::new(self.book.idle, "", "")
    }

    pub fn trigger_label(&self, state: TriggerState) -> &'static str {
        match state {
            TriggerState::Ready => self.book.trigger_ready,
            TriggerState::Running => self.book.trigger_running,
            TriggerState::Finished => self.book.trigger_finished,
        }
    }

    pub fn instruction(&self, text: String) -> SpeechRequest {
        let voice = &self.config.voice;
        SpeechRequest::new(text, voice, voice.instruction_rate)
    }

    pub fn count(&self, text: String) -> SpeechRequest {
        let voice = &self.config.voice;
        SpeechRequest::new(text, voice, voice.count_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcue_types::{CountDirection, VoiceSettings};

    fn config(language: &str) -> RoutineConfig {
        RoutineConfig {
            sets: 3,
            reps_per_side: 5,
            lift_seconds: 5,
            lower_seconds: 3,
            prep_seconds: 2,
            posture_seconds: 0,
            voice: VoiceSettings {
                language: language.to_string(),
                ..VoiceSettings::default()
            },
            ..RoutineConfig::default()
        }
    }

    fn at(set_index: u32, side: Side, rep_index: u32, phase: Phase) -> SequencerPosition {
        SequencerPosition {
            set_index,
            side,
            rep_index,
            phase,
        }
    }

    fn tick(index: u32, value: u32) -> Option<Tick> {
        Some(Tick { index, value })
    }

    #[test]
    fn test_english_matrix() {
        let config = config("en-GB");
        let cases = [
            (
                SequencerPosition::start(),
                None,
                ("Sit tall on the chair. Keep your back straight.", "", ""),
                Some("Sit tall on the chair. Keep your back straight."),
            ),
            (
                at(2, Side::Left, 1, Phase::Prep),
                None,
                ("Starting set 2. Get ready.", "", "1 s"),
                Some("Starting set 2. Get ready."),
            ),
            (
                at(2, Side::Left, 1, Phase::Prep),
                tick(2, 2),
                ("Starting set 2. Get ready.", "", "2 s"),
                Some("2"),
            ),
            (
                at(1, Side::Right, 4, Phase::Lift),
                None,
                ("Right leg up", "Set 1 of 3 · Rep 4 of 5", "1 s"),
                Some("Right leg up"),
            ),
            (
                at(1, Side::Right, 4, Phase::Lift),
                tick(3, 3),
                ("Right leg up", "Set 1 of 3 · Rep 4 of 5", "3 s"),
                Some("3"),
            ),
            (
                at(3, Side::Left, 2, Phase::Lower),
                tick(1, 1),
                ("Left leg down", "Set 3 of 3 · Rep 2 of 5", "1 s"),
                None,
            ),
            (
                at(1, Side::Right, 5, Phase::SetTransition),
                None,
                ("Set 1 complete.", "", "Get ready for set 2."),
                Some("Set 1 complete. Get ready for set 2."),
            ),
            (
                at(3, Side::Right, 5, Phase::Complete),
                None,
                ("Workout complete. Well done. 👍", "", "Great job!"),
                Some("Workout complete. Well done."),
            ),
        ];

        for (position, tick, (action, progress, detail), spoken) in cases {
            let narration = narrate(&config, &position, tick);
            assert_eq!(
                narration.display,
                DisplayLines::new(action, progress, detail),
                "display for {position:?} {tick:?}"
            );
            assert_eq!(narration.spoken.as_deref(), spoken, "speech for {position:?}");
        }
    }

    #[test]
    fn test_korean_matrix() {
        let config = config("ko-KR");

        let lift = narrate(&config, &at(1, Side::Left, 1, Phase::Lift), tick(1, 1));
        assert_eq!(
            lift.display,
            DisplayLines::new("왼쪽 다리 올리세요", "1/3세트 · 1/5회", "1초")
        );
        assert_eq!(lift.spoken.as_deref(), Some("하나"));

        let transition = narrate(&config, &at(1, Side::Right, 5, Phase::SetTransition), None);
        assert_eq!(
            transition.spoken.as_deref(),
            Some("1세트 완료하셨습니다. 2세트 시작합니다. 준비하세요.")
        );
        assert_eq!(transition.display.detail, "2세트 시작 준비");
    }

    #[test]
    fn test_descending_entry_shows_full_duration() {
        let config = RoutineConfig {
            count_direction: CountDirection::Descending,
            ..config("en-GB")
        };
        let entry = narrate(&config, &at(1, Side::Left, 1, Phase::Lower), None);
        assert_eq!(entry.display.detail, "3 s");
        assert_eq!(entry.spoken.as_deref(), Some("Left leg down"));
    }

    #[test]
    fn test_deterministic() {
        let config = config("en-GB");
        let position = at(2, Side::Right, 3, Phase::Lift);
        assert_eq!(
            narrate(&config, &position, tick(2, 2)),
            narrate(&config, &position, tick(2, 2))
        );
    }

    #[test]
    fn test_narrator_requests_use_voice_rates() {
        let narrator = Narrator::new(Arc::new(config("en-GB")));
        assert_eq!(narrator.instruction("Left leg up".into()).rate, 0.95);
        assert_eq!(narrator.count("1".into()).rate, 1.05);
        assert_eq!(narrator.idle().action, "Press the button to start.");
        assert_eq!(narrator.trigger_label(TriggerState::Running), "In progress…");
    }
}
