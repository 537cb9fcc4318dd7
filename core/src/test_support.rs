//! Test doubles for the display, trigger and speech engine collaborators

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::narration::DisplayLines;
use crate::session::{DisplaySink, Trigger, TriggerState};
use crate::speech::{SpeechEngine, SpeechRequest};

/// Records every frame shown
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    frames: Mutex<Vec<DisplayLines>>,
}

impl RecordingDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn frames(&self) -> Vec<DisplayLines> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<DisplayLines> {
        self.frames.lock().unwrap().last().cloned()
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&self, lines: &DisplayLines) {
        self.frames.lock().unwrap().push(lines.clone());
    }
}

/// Records trigger state changes and their labels
#[derive(Debug, Default)]
pub struct RecordingTrigger {
    updates: Mutex<Vec<(TriggerState, String)>>,
}

impl RecordingTrigger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<TriggerState> {
        self.updates.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|(_, l)| l.clone())
            .collect()
    }
}

impl Trigger for RecordingTrigger {
    fn update(&self, state: TriggerState, label: &str) {
        self.updates.lock().unwrap().push((state, label.to_string()));
    }
}

#[derive(Debug, Default)]
struct EngineState {
    spoken: Vec<String>,
    current: Option<(u64, oneshot::Sender<()>)>,
    next_id: u64,
    active: usize,
    max_concurrent: usize,
    interrupted: usize,
}

/// Speech engine whose utterances take a fixed (virtual) time
#[derive(Debug)]
pub struct ScriptedEngine {
    /// `None` fails every utterance immediately
    utterance_time: Option<Duration>,
    state: Arc<Mutex<EngineState>>,
}

impl ScriptedEngine {
    pub fn with_utterance_time(utterance_time: Duration) -> Arc<Self> {
        Arc::new(Self {
            utterance_time: Some(utterance_time),
            state: Arc::default(),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            utterance_time: None,
            state: Arc::default(),
        })
    }

    /// Texts in the order they were handed to the engine
    pub fn spoken(&self) -> Vec<String> {
        self.state.lock().unwrap().spoken.clone()
    }

    /// Most utterances ever rendering at the same time
    pub fn max_concurrent(&self) -> usize {
        self.state.lock().unwrap().max_concurrent
    }

    /// Utterances cut short by `stop`
    pub fn interrupted(&self) -> usize {
        self.state.lock().unwrap().interrupted
    }
}

impl SpeechEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some((_, done)) = state.current.take() {
            state.active -= 1;
            state.interrupted += 1;
            let _ = done.send(());
        }
    }

    fn speak(&self, request: &SpeechRequest) -> oneshot::Receiver<()> {
        let (done, rx) = oneshot::channel();
        let mut state = self.state.lock().unwrap();
        state.spoken.push(request.text.clone());

        let Some(utterance_time) = self.utterance_time else {
            return rx;
        };

        let id = state.next_id;
        state.next_id += 1;
        state.active += 1;
        state.max_concurrent = state.max_concurrent.max(state.active);
        state.current = Some((id, done));

        let shared = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(utterance_time).await;
            let mut state = shared.lock().unwrap();
            if matches!(state.current, Some((current, _)) if current == id) {
                if let Some((_, done)) = state.current.take() {
                    state.active -= 1;
                    let _ = done.send(());
                }
            }
        });

        rx
    }
}
