//! Speech requests and their completion tickets

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use liftcue_types::VoiceSettings;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// One utterance submitted for spoken rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// BCP 47 language tag handed to the engine
    pub language: String,
}

impl SpeechRequest {
    /// Build a request using the voice's pitch, volume and language
    pub fn new(text: impl Into<String>, voice: &VoiceSettings, rate: f32) -> Self {
        Self {
            text: text.into(),
            rate,
            pitch: voice.pitch,
            volume: voice.volume,
            language: voice.language.clone(),
        }
    }
}

/// Primary subtag of a BCP 47 tag, lowercased ("en-GB" -> "en")
pub(crate) fn primary_language(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .filter(|subtag| !subtag.is_empty())
        .unwrap_or("en")
        .to_ascii_lowercase()
}

/// How a ticket was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// The engine finished (or failed) rendering the utterance, or the queue
    /// is silent and skipped it
    Spoken,
    /// The queue was flushed before the utterance completed
    Abandoned,
}

/// Completion handle returned by [`SpeechQueue::enqueue`](super::SpeechQueue::enqueue).
///
/// Awaiting is optional: dropping a ticket does not cancel the utterance.
#[derive(Debug)]
pub struct SpeechTicket {
    rx: oneshot::Receiver<()>,
    settled: Option<SpeechOutcome>,
}

impl SpeechTicket {
    pub(crate) fn pending() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, settled: None })
    }

    /// A ticket that is already complete (silent queue)
    pub(crate) fn spoken() -> Self {
        let (_, rx) = oneshot::channel();
        Self {
            rx,
            settled: Some(SpeechOutcome::Spoken),
        }
    }

    /// Non-blocking check; `None` while the utterance is queued or in flight
    pub fn outcome(&mut self) -> Option<SpeechOutcome> {
        if self.settled.is_none() {
            self.settled = match self.rx.try_recv() {
                Ok(()) => Some(SpeechOutcome::Spoken),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Closed) => Some(SpeechOutcome::Abandoned),
            };
        }
        self.settled
    }

    pub fn is_spoken(&mut self) -> bool {
        self.outcome() == Some(SpeechOutcome::Spoken)
    }
}

impl Future for SpeechTicket {
    type Output = SpeechOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.settled {
            return Poll::Ready(outcome);
        }
        let outcome = match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(())) => SpeechOutcome::Spoken,
            Poll::Ready(Err(_)) => SpeechOutcome::Abandoned,
            Poll::Pending => return Poll::Pending,
        };
        self.settled = Some(outcome);
        Poll::Ready(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticket_settles_once() {
        let (tx, mut ticket) = SpeechTicket::pending();
        assert_eq!(ticket.outcome(), None);

        tx.send(()).unwrap();
        assert!(ticket.is_spoken());
        // Polling after a successful try_recv must not touch the receiver again
        assert_eq!(ticket.await, SpeechOutcome::Spoken);
    }

    #[tokio::test]
    async fn test_dropped_sender_abandons() {
        let (tx, mut ticket) = SpeechTicket::pending();
        drop(tx);
        assert!(!ticket.is_spoken());
        assert_eq!(ticket.await, SpeechOutcome::Abandoned);
    }

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("ko-KR"), "ko");
        assert_eq!(primary_language("EN_gb"), "en");
        assert_eq!(primary_language(""), "en");
    }

    #[test]
    fn test_request_takes_voice_parameters() {
        let voice = VoiceSettings {
            language: "ko-KR".to_string(),
            pitch: 1.2,
            volume: 0.5,
            ..VoiceSettings::default()
        };
        let request = SpeechRequest::new("하나", &voice, voice.count_rate);
        assert_eq!(request.language, "ko-KR");
        assert_eq!(request.rate, 1.05);
        assert_eq!(request.pitch, 1.2);
        assert_eq!(request.volume, 0.5);
    }
}
