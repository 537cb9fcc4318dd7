use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use liftcue::repl;
use liftcue::{Cli, Mode, TerminalDisplay, TerminalTrigger};
use liftcue_core::{Session, SessionOutcome, SpeechQueue, system_engine};

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let _log_guard = liftcue::logging::init();

    let config = cli.overrides.resolve().map_err(|e| e.to_string())?;

    let engine = if config.voice_enabled() {
        match system_engine(&cli.speech_program).await {
            Ok(engine) => Some(engine),
            Err(e) => {
                tracing::warn!(error = %e, "speech engine unavailable, continuing without voice");
                None
            }
        }
    } else {
        None
    };
    let queue = SpeechQueue::for_voice(engine, config.voice_enabled());

    let interactive = !matches!(cli.command, Some(Mode::Run));
    // Repainting in place fights with the prompt, so only `run` does it
    let repaint = !interactive && std::io::stdout().is_terminal();
    let display = Arc::new(TerminalDisplay::stdout(repaint));
    let trigger = Arc::new(TerminalTrigger::new());
    let session = Arc::new(Session::new(config, queue, display, trigger));

    if interactive {
        return repl::run(session).await;
    }

    let runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.start_session().await }
    });
    let abort = tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                session.abort();
            }
        }
    });

    let outcome = runner.await.map_err(|e| e.to_string())?;
    abort.abort();
    eprintln!("{}", repl::describe(&outcome));

    match outcome {
        SessionOutcome::Failed { reason } => Err(reason),
        _ => Ok(()),
    }
}
