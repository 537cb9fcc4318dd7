//! Speech subsystem
//!
//! This module provides:
//! - **Requests**: One utterance plus its voice parameters, and the ticket
//!   that reports when it finished
//! - **Queue**: Single-consumer FIFO that keeps exactly one utterance in flight
//! - **Engines**: The rendering collaborator (`SpeechEngine`), a
//!   process-backed implementation driving espeak-style TTS programs, and
//!   the system TTS service on Windows and macOS
//!
//! A queue built without an engine (or with voice disabled) resolves every
//! ticket immediately, so narration never adds to or removes from the
//! routine's schedule.

mod engine;
mod error;
mod queue;
mod request;
#[cfg(not(target_os = "linux"))]
mod tts_engine;

use std::sync::Arc;

pub use engine::{CommandEngine, SpeechEngine};
pub use error::EngineError;
pub use queue::{QueueStatus, SpeechQueue};
pub use request::{SpeechOutcome, SpeechRequest, SpeechTicket};
#[cfg(not(target_os = "linux"))]
pub use tts_engine::TtsEngine;

/// The engine for this platform: the system TTS service on Windows and
/// macOS, otherwise (or if it fails) the espeak-style `program`.
pub async fn system_engine(program: &str) -> Result<Arc<dyn SpeechEngine>, EngineError> {
    #[cfg(not(target_os = "linux"))]
    {
        match TtsEngine::new() {
            Ok(engine) => return Ok(Arc::new(engine)),
            Err(e) => tracing::warn!(error = %e, program, "system TTS unavailable, trying program"),
        }
    }

    let engine = CommandEngine::detect(program).await?;
    Ok(Arc::new(engine))
}
