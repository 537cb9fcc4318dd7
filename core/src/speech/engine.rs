//! Speech engine collaborator
//!
//! The queue talks to an engine through two calls: `stop` (hard hand-off,
//! ends whatever is being rendered) and `speak` (start rendering, report
//! completion on the returned channel). Success and failure are not
//! distinguished; a dropped completion sender counts as "done".

use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use tokio::process::Command;
use tokio::sync::oneshot;

use super::error::EngineError;
use super::request::{SpeechRequest, primary_language};

/// Renders utterances asynchronously.
pub trait SpeechEngine: Send + Sync + 'static {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Stop the current rendering immediately. No-op when idle.
    fn stop(&self);

    /// Begin rendering `request`. The receiver resolves (or closes) once the
    /// utterance is finished.
    fn speak(&self, request: &SpeechRequest) -> oneshot::Receiver<()>;
}

/// espeak's default speaking rate in words per minute
const BASE_WPM: f32 = 175.0;

/// Speaks through an external espeak-compatible program
/// (`espeak-ng`, `espeak`), one child process per utterance.
#[derive(Debug)]
pub struct CommandEngine {
    program: String,
    /// Kill switch for the child currently rendering
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    /// Check that `program` can be spawned before handing it to a queue
    pub async fn detect(program: &str) -> Result<Self, EngineError> {
        Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| EngineError::Unavailable {
                program: program.to_string(),
                source,
            })?;

        tracing::debug!(program, "speech program available");
        Ok(Self::new(program))
    }

    /// Command-line arguments for one utterance
    fn args(request: &SpeechRequest) -> Vec<String> {
        // espeak voices are keyed by the primary language subtag ("en", "ko")
        let voice = primary_language(&request.language);
        let wpm = (BASE_WPM * request.rate).round().max(80.0) as u32;
        let pitch = (50.0 * request.pitch).round().clamp(0.0, 99.0) as u32;
        let amplitude = (100.0 * request.volume).round().clamp(0.0, 200.0) as u32;

        vec![
            "-v".to_string(),
            voice,
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            request.text.clone(),
        ]
    }
}

impl SpeechEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn stop(&self) {
        let kill = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(kill) = kill {
            let _ = kill.send(());
        }
    }

    fn speak(&self, request: &SpeechRequest) -> oneshot::Receiver<()> {
        let (done_tx, done_rx) = oneshot::channel();
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        // Replacing the switch drops the previous sender, which also ends
        // that child: a new utterance always supersedes the old one.
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(kill_tx);

        let program = self.program.clone();
        let args = Self::args(request);
        tokio::spawn(async move {
            let mut child = match Command::new(&program)
                .args(&args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
            {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(program, error = %e, "failed to start speech program");
                    return;
                }
            };

            let killed = tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        tracing::warn!(program, error = %e, "speech program did not exit cleanly");
                    }
                    false
                }
                _ = kill_rx => true,
            };
            if killed {
                let _ = child.kill().await;
            }
            let _ = done_tx.send(());
        });

        done_rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcue_types::VoiceSettings;

    #[test]
    fn test_args_map_voice_parameters() {
        let voice = VoiceSettings {
            language: "ko-KR".to_string(),
            pitch: 1.0,
            volume: 0.5,
            ..VoiceSettings::default()
        };
        let request = SpeechRequest::new("셋", &voice, 1.0);

        let args = CommandEngine::args(&request);
        assert_eq!(
            args,
            vec!["-v", "ko", "-s", "175", "-p", "50", "-a", "50", "셋"]
        );
    }

    #[test]
    fn test_args_clamp_extremes() {
        let voice = VoiceSettings {
            language: "EN_gb".to_string(),
            pitch: 3.0,
            ..VoiceSettings::default()
        };
        let request = SpeechRequest::new("1", &voice, 0.1);

        let args = CommandEngine::args(&request);
        assert_eq!(args[1], "en");
        assert_eq!(args[3], "80");
        assert_eq!(args[5], "99");
    }

    #[tokio::test]
    async fn test_detect_missing_program() {
        let result = CommandEngine::detect("liftcue-no-such-speech-program").await;
        assert!(matches!(result, Err(EngineError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_unstartable_program_still_completes() {
        let engine = CommandEngine::new("liftcue-no-such-speech-program");
        let done = engine.speak(&SpeechRequest::new("hi", &VoiceSettings::default(), 1.0));
        // The completion sender is dropped on spawn failure
        assert!(done.await.is_err());
    }
}
