//! Terminal display sink and start trigger
//!
//! The display repaints its three lines in place; the trigger prints the
//! label the prompt's `start` command currently stands for.

use std::io::{Stdout, Write};
use std::sync::{Mutex, PoisonError};

use liftcue_core::{DisplayLines, DisplaySink, Trigger, TriggerState};

/// Lines written by the previous frame, rewound before each repaint
const FRAME_LINES: usize = 3;

pub struct TerminalDisplay<W: Write + Send = Stdout> {
    out: Mutex<Frame<W>>,
}

struct Frame<W> {
    writer: W,
    /// Cursor escapes are only emitted on a real terminal
    repaint: bool,
    drawn: bool,
}

impl TerminalDisplay {
    pub fn stdout(repaint: bool) -> Self {
        Self::new(std::io::stdout(), repaint)
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(writer: W, repaint: bool) -> Self {
        Self {
            out: Mutex::new(Frame {
                writer,
                repaint,
                drawn: false,
            }),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Frame<W>> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn show(&self, lines: &DisplayLines) {
        let mut frame = self.lock();
        if let Err(e) = frame.paint(lines) {
            tracing::warn!(error = %e, "failed to write display frame");
        }
    }
}

impl<W: Write> Frame<W> {
    fn paint(&mut self, lines: &DisplayLines) -> std::io::Result<()> {
        if self.repaint && self.drawn {
            // Up to the first line of the previous frame, then clear below
            write!(self.writer, "\x1b[{FRAME_LINES}F\x1b[J")?;
        }
        for line in [&lines.action, &lines.progress, &lines.detail] {
            writeln!(self.writer, "{line}")?;
        }
        self.writer.flush()?;
        self.drawn = true;
        Ok(())
    }
}

/// Prints trigger changes as a bracketed label
pub struct TerminalTrigger {
    state: Mutex<Option<TriggerState>>,
}

impl TerminalTrigger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Whether `start` is currently accepted
    pub fn is_enabled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none_or(TriggerState::is_enabled)
    }
}

impl Default for TerminalTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Trigger for TerminalTrigger {
    fn update(&self, state: TriggerState, label: &str) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state);
        tracing::debug!(?state, label, "trigger updated");
        if state.is_enabled() {
            eprintln!("[{label}] type `start` to begin");
        } else {
            eprintln!("[{label}]");
        }
    }
}
