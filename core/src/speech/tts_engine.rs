//! Platform text-to-speech (SAPI/WinRT on Windows, AVFoundation on macOS)
//!
//! Completion comes from the service's utterance-end callback. Backends that
//! report no callbacks, or never deliver one, are settled by a fallback timer
//! sized to the text so the queue cannot stall.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tts::{Tts, UtteranceId};

use super::engine::SpeechEngine;
use super::error::EngineError;
use super::request::{SpeechRequest, primary_language};

type Current = Arc<Mutex<Option<(UtteranceId, oneshot::Sender<()>)>>>;

/// Speaks through the operating system's TTS service
pub struct TtsEngine {
    service: Mutex<Service>,
    /// Utterance being rendered and its completion sender
    current: Current,
}

struct Service {
    tts: Tts,
    /// Language tag the selected system voice was chosen for
    language: Option<String>,
}

impl TtsEngine {
    pub fn new() -> Result<Self, EngineError> {
        let tts = Tts::default()?;
        let current: Current = Arc::default();

        if tts.supported_features().utterance_callbacks {
            let on_end = Arc::clone(&current);
            tts.on_utterance_end(Some(Box::new(move |id| finish(&on_end, id))))?;
        } else {
            tracing::debug!("system TTS has no utterance callbacks, using timed completion");
        }

        tracing::debug!("system TTS initialized");
        Ok(Self {
            service: Mutex::new(Service {
                tts,
                language: None,
            }),
            current,
        })
    }
}

impl SpeechEngine for TtsEngine {
    fn name(&self) -> &str {
        "system-tts"
    }

    fn stop(&self) {
        // The dropped sender settles the in-flight ticket
        drop(lock(&self.current).take());
        if let Err(e) = lock(&self.service).tts.stop() {
            tracing::warn!(error = %e, "failed to stop system TTS");
        }
    }

    fn speak(&self, request: &SpeechRequest) -> oneshot::Receiver<()> {
        let (done, rx) = oneshot::channel();
        let mut service = lock(&self.service);
        service.apply(request);

        // Held across `speak` so the end callback cannot run before the id
        // is recorded
        let mut current = lock(&self.current);
        match service.tts.speak(request.text.as_str(), false) {
            Ok(Some(id)) => {
                *current = Some((id.clone(), done));
                let watched = Arc::clone(&self.current);
                let timeout = fallback_duration(&request.text, request.rate);
                tokio::spawn(async move {
                    tokio::time::sleep(timeout).await;
                    finish(&watched, id);
                });
            }
            // No id to match a callback against
            Ok(None) => drop(done),
            Err(e) => tracing::warn!(error = %e, "system TTS failed to speak"),
        }

        rx
    }
}

impl Service {
    /// Push the request's voice parameters to the service where supported
    fn apply(&mut self, request: &SpeechRequest) {
        let features = self.tts.supported_features();
        let tts = &mut self.tts;

        if features.rate {
            let rate = scale(request.rate, tts.min_rate(), tts.normal_rate(), tts.max_rate());
            if let Err(e) = tts.set_rate(rate) {
                tracing::warn!(error = %e, rate, "failed to set speech rate");
            }
        }
        if features.pitch {
            let pitch = scale(request.pitch, tts.min_pitch(), tts.normal_pitch(), tts.max_pitch());
            if let Err(e) = tts.set_pitch(pitch) {
                tracing::warn!(error = %e, pitch, "failed to set speech pitch");
            }
        }
        if features.volume {
            let volume = span(request.volume, tts.min_volume(), tts.max_volume());
            if let Err(e) = tts.set_volume(volume) {
                tracing::warn!(error = %e, volume, "failed to set speech volume");
            }
        }
        if features.voice && self.language.as_deref() != Some(request.language.as_str()) {
            self.select_voice(&request.language);
            self.language = Some(request.language.clone());
        }
    }

    /// Prefer an exact tag match, then any voice with the same primary subtag
    fn select_voice(&mut self, language: &str) {
        let voices = match self.tts.voices() {
            Ok(voices) => voices,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list system voices");
                return;
            }
        };
        let primary = primary_language(language);
        let voice = voices
            .iter()
            .find(|v| v.language().to_string().eq_ignore_ascii_case(language))
            .or_else(|| {
                voices
                    .iter()
                    .find(|v| primary_language(&v.language().to_string()) == primary)
            });

        match voice {
            Some(voice) => {
                if let Err(e) = self.tts.set_voice(voice) {
                    tracing::warn!(error = %e, language, "failed to select system voice");
                }
            }
            None => tracing::warn!(language, "no system voice for language, using default"),
        }
    }
}

/// Settle `id` if it is still the utterance being rendered
fn finish(current: &Current, id: UtteranceId) {
    let mut current = lock(current);
    if matches!(current.as_ref(), Some((active, _)) if *active == id) {
        if let Some((_, done)) = current.take() {
            let _ = done.send(());
        }
    }
}

/// `factor` times the service's normal value, kept inside its range
fn scale(factor: f32, min: f32, normal: f32, max: f32) -> f32 {
    (normal * factor).clamp(min, max)
}

/// `fraction` (0..=1) of the way from `min` to `max`
fn span(fraction: f32, min: f32, max: f32) -> f32 {
    min + (max - min) * fraction.clamp(0.0, 1.0)
}

/// Generous upper bound on how long `text` takes to say at `rate`
fn fallback_duration(text: &str, rate: f32) -> Duration {
    let chars = text.chars().count() as f32;
    let seconds = 1.0 + 0.12 * chars / rate.max(0.1);
    Duration::from_secs_f32(seconds)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
