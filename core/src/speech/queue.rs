//! Speech queue
//!
//! Runs in a background task, receiving commands via channel. Requests are
//! spoken strictly in enqueue order with at most one utterance in flight:
//! the next request is dispatched only after the engine reports the current
//! one complete. Pending requests are never dropped, only delayed, until the
//! queue is flushed at session teardown.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::engine::SpeechEngine;
use super::request::{SpeechRequest, SpeechTicket};

/// Snapshot of the queue for status reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStatus {
    /// Requests waiting behind the in-flight one
    pub pending: usize,
    pub in_flight: bool,
    /// Requests handed to the engine since the queue was created
    pub dispatched: u64,
}

impl QueueStatus {
    pub fn is_empty(&self) -> bool {
        self.pending == 0 && !self.in_flight
    }
}

enum QueueCommand {
    Enqueue {
        request: SpeechRequest,
        done: oneshot::Sender<()>,
    },
    Flush {
        ack: oneshot::Sender<usize>,
    },
    Status {
        reply: oneshot::Sender<QueueStatus>,
    },
}

/// Handle to the speech queue. Cheap to clone; the worker stops once every
/// handle is dropped.
#[derive(Clone)]
pub struct SpeechQueue {
    /// `None` for a silent queue (voice disabled or no engine)
    commands: Option<mpsc::UnboundedSender<QueueCommand>>,
}

impl std::fmt::Debug for SpeechQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechQueue")
            .field("silent", &self.is_silent())
            .finish()
    }
}

impl SpeechQueue {
    /// Spawn a queue worker speaking through `engine`
    pub fn spawn(engine: Arc<dyn SpeechEngine>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::debug!(engine = engine.name(), "speech queue started");
        tokio::spawn(QueueWorker::new(engine, rx).run());
        Self { commands: Some(tx) }
    }

    /// A queue that resolves every request immediately without speaking
    pub fn silent() -> Self {
        Self { commands: None }
    }

    /// Spawn a worker only when voice is enabled and an engine is available
    pub fn for_voice(engine: Option<Arc<dyn SpeechEngine>>, enabled: bool) -> Self {
        match engine {
            Some(engine) if enabled => Self::spawn(engine),
            _ => Self::silent(),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.commands.is_none()
    }

    /// Append a request to the tail of the queue.
    ///
    /// The returned ticket resolves when this utterance finishes. On a silent
    /// queue it is already resolved.
    pub fn enqueue(&self, request: SpeechRequest) -> SpeechTicket {
        let Some(commands) = &self.commands else {
            return SpeechTicket::spoken();
        };

        let (done, ticket) = SpeechTicket::pending();
        if commands
            .send(QueueCommand::Enqueue { request, done })
            .is_err()
        {
            tracing::warn!("speech queue worker has stopped, skipping utterance");
            return SpeechTicket::spoken();
        }
        ticket
    }

    /// Discard every pending request and stop the one in flight.
    ///
    /// Their tickets never report `Spoken`. Returns how many requests were
    /// abandoned.
    pub async fn flush(&self) -> usize {
        let Some(commands) = &self.commands else {
            return 0;
        };

        let (ack, rx) = oneshot::channel();
        if commands.send(QueueCommand::Flush { ack }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    pub async fn status(&self) -> QueueStatus {
        let Some(commands) = &self.commands else {
            return QueueStatus::default();
        };

        let (reply, rx) = oneshot::channel();
        if commands.send(QueueCommand::Status { reply }).is_err() {
            return QueueStatus::default();
        }
        rx.await.unwrap_or_default()
    }
}

struct PendingRequest {
    request: SpeechRequest,
    done: oneshot::Sender<()>,
}

struct InFlight {
    text: String,
    done: oneshot::Sender<()>,
    completion: oneshot::Receiver<()>,
}

enum WorkerEvent {
    Command(Option<QueueCommand>),
    Completed,
}

struct QueueWorker {
    engine: Arc<dyn SpeechEngine>,
    commands: mpsc::UnboundedReceiver<QueueCommand>,
    pending: VecDeque<PendingRequest>,
    in_flight: Option<InFlight>,
    dispatched: u64,
}

impl QueueWorker {
    fn new(
        engine: Arc<dyn SpeechEngine>,
        commands: mpsc::UnboundedReceiver<QueueCommand>,
    ) -> Self {
        Self {
            engine,
            commands,
            pending: VecDeque::new(),
            in_flight: None,
            dispatched: 0,
        }
    }

    async fn run(mut self) {
        loop {
            if self.in_flight.is_none() {
                self.dispatch_next();
            }

            let event = match self.in_flight.as_mut() {
                Some(flight) => tokio::select! {
                    command = self.commands.recv() => WorkerEvent::Command(command),
                    _ = &mut flight.completion => WorkerEvent::Completed,
                },
                None => WorkerEvent::Command(self.commands.recv().await),
            };

            match event {
                WorkerEvent::Command(Some(command)) => self.handle(command),
                WorkerEvent::Command(None) => break,
                WorkerEvent::Completed => self.complete_in_flight(),
            }
        }

        if self.in_flight.take().is_some() {
            self.engine.stop();
        }
        tracing::debug!("speech queue stopped");
    }

    fn handle(&mut self, command: QueueCommand) {
        match command {
            QueueCommand::Enqueue { request, done } => {
                tracing::debug!(
                    text = %request.text,
                    pending = self.pending.len(),
                    "speech request queued"
                );
                self.pending.push_back(PendingRequest { request, done });
            }
            QueueCommand::Flush { ack } => {
                let mut abandoned = self.pending.len();
                // Dropping the senders leaves the tickets unspoken
                self.pending.clear();
                if self.in_flight.take().is_some() {
                    self.engine.stop();
                    abandoned += 1;
                }
                tracing::debug!(abandoned, "speech queue flushed");
                let _ = ack.send(abandoned);
            }
            QueueCommand::Status { reply } => {
                let _ = reply.send(QueueStatus {
                    pending: self.pending.len(),
                    in_flight: self.in_flight.is_some(),
                    dispatched: self.dispatched,
                });
            }
        }
    }

    fn dispatch_next(&mut self) {
        let Some(next) = self.pending.pop_front() else {
            return;
        };

        // Hard hand-off: nothing else may still be rendering on the engine
        self.engine.stop();
        let completion = self.engine.speak(&next.request);
        self.dispatched += 1;
        tracing::debug!(text = %next.request.text, "speech request dispatched");

        self.in_flight = Some(InFlight {
            text: next.request.text,
            done: next.done,
            completion,
        });
    }

    fn complete_in_flight(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            tracing::debug!(text = %flight.text, "speech request completed");
            let _ = flight.done.send(());
        }
    }
}
