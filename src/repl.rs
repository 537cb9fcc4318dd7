//! Interactive prompt
//!
//! Each line is split with shell quoting rules and parsed as a clap command,
//! so `start`, `abort`, `status`, `config` and `exit` behave like
//! subcommands. `start` runs the session in the background; the prompt
//! stays responsive so `abort` can reach it.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use liftcue_core::{RoutineConfigExt, Session, SessionOutcome, config_path};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, PartialEq, Subcommand)]
enum Commands {
    /// Start a session (ignored while one is running)
    Start,
    /// Stop the running session at the next phase boundary
    Abort,
    /// Show whether a session is running and the speech queue state
    Status,
    /// Show the active routine settings
    Config {
        /// Store the active settings as the user config
        #[arg(long)]
        save: bool,
        /// Store to this file instead of the user config
        #[arg(long, requires = "save")]
        path: Option<PathBuf>,
    },
    Exit,
}

pub async fn run(session: Arc<Session>) -> Result<(), String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &session).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    if session.abort() {
        tracing::info!("prompt closed with a session running, aborting");
    }
    Ok(())
}

fn prompt() -> Result<(), String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "> ").map_err(|e| e.to_string())?;
    stderr.flush().map_err(|e| e.to_string())
}

fn parse(line: &str) -> Result<Option<Commands>, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "liftcue".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(cli.command)
}

async fn respond(line: &str, session: &Arc<Session>) -> Result<bool, String> {
    match parse(line)? {
        Some(Commands::Start) => {
            if session.is_running() {
                eprintln!("a session is already running");
                return Ok(false);
            }
            let session = Arc::clone(session);
            tokio::spawn(async move {
                let outcome = session.start_session().await;
                eprintln!("{}", describe(&outcome));
            });
        }
        Some(Commands::Abort) => {
            if !session.abort() {
                eprintln!("no session is running");
            }
        }
        Some(Commands::Status) => {
            let queue = session.queue_status().await;
            eprintln!(
                "running: {}, speech pending: {}, speaking: {}, spoken so far: {}",
                session.is_running(),
                queue.pending,
                queue.in_flight,
                queue.dispatched
            );
        }
        Some(Commands::Config { save, path }) => {
            show_config(session);
            if save {
                save_config(session, path.as_deref())?;
            }
        }
        Some(Commands::Exit) => {
            eprintln!("quitting...");
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}

fn show_config(session: &Session) {
    let config = session.config();
    if let Ok(path) = config_path() {
        eprintln!("config file: {}", path.display());
    }
    eprintln!(
        "sets: {}, reps per side: {}",
        config.sets, config.reps_per_side
    );
    eprintln!(
        "posture {}s, prep {}s, lift {}s, lower {}s, pause between sets {}ms",
        config.posture_seconds,
        config.prep_seconds,
        config.lift_seconds,
        config.lower_seconds,
        config.set_pause_ms
    );
    eprintln!("total ticks per session: {}", config.total_ticks());
    eprintln!(
        "voice: {} ({}), counting {:?}",
        if config.voice_enabled() { "on" } else { "off" },
        config.language_tag(),
        config.count_direction
    );
}

fn save_config(session: &Session, path: Option<&std::path::Path>) -> Result<(), String> {
    let config = session.config();
    match path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .map_err(|e| e.to_string())?;
    eprintln!("settings saved");
    Ok(())
}

/// One-line report of how a session ended
pub fn describe(outcome: &SessionOutcome) -> String {
    match outcome {
        SessionOutcome::Refused => "a session is already running".to_string(),
        SessionOutcome::Completed(summary) => format!(
            "session complete: {} phases, {} ticks in {:.1}s (started {})",
            summary.phases,
            summary.ticks,
            summary.elapsed.as_secs_f64(),
            summary.started_at.format("%H:%M:%S")
        ),
        SessionOutcome::Aborted { at, summary } => format!(
            "session aborted before set {} {:?} after {:.1}s",
            at.set_index,
            at.phase,
            summary.elapsed.as_secs_f64()
        ),
        SessionOutcome::Failed { reason } => format!("session failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{TerminalDisplay, TerminalTrigger};
    use liftcue_core::{Phase, RoutineConfig, RunSummary, SequencerPosition, SpeechQueue};
    use std::time::Duration;

    fn summary() -> RunSummary {
        RunSummary {
            ticks: 14,
            phases: 13,
            started_at: chrono::Local::now(),
            elapsed: Duration::from_millis(15_500),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("start").unwrap(), Some(Commands::Start));
        assert_eq!(parse("  abort ").unwrap(), Some(Commands::Abort));
        assert_eq!(parse("exit").unwrap(), Some(Commands::Exit));
        assert_eq!(
            parse("config").unwrap(),
            Some(Commands::Config {
                save: false,
                path: None
            })
        );
        assert_eq!(
            parse("config --save --path '/tmp/my routine.toml'").unwrap(),
            Some(Commands::Config {
                save: true,
                path: Some(PathBuf::from("/tmp/my routine.toml"))
            })
        );
        // A path alone would silently do nothing
        assert!(parse("config --path routine.toml").is_err());
        assert!(parse("jump").is_err());
        assert!(parse("start \"unterminated").is_err());
    }

    #[test]
    fn test_describe_outcomes() {
        assert_eq!(
            describe(&SessionOutcome::Failed {
                reason: "boom".to_string()
            }),
            "session failed: boom"
        );

        let completed = describe(&SessionOutcome::Completed(summary()));
        assert!(completed.starts_with("session complete: 13 phases, 14 ticks in 15.5s"));

        let aborted = describe(&SessionOutcome::Aborted {
            at: SequencerPosition {
                phase: Phase::Prep,
                ..SequencerPosition::start()
            },
            summary: summary(),
        });
        assert_eq!(aborted, "session aborted before set 1 Prep after 15.5s");
    }

    #[test]
    fn test_config_save_to_path() {
        let config = RoutineConfig {
            sets: 2,
            reps_per_side: 3,
            ..RoutineConfig::default()
        };
        let session = Session::new(
            config.clone(),
            SpeechQueue::silent(),
            Arc::new(TerminalDisplay::new(Vec::new(), false)),
            Arc::new(TerminalTrigger::new()),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routine.toml");

        save_config(&session, Some(&path)).unwrap();

        assert_eq!(RoutineConfig::load_from_path(&path).unwrap(), config);
        let err = save_config(&session, Some(dir.path())).unwrap_err();
        assert!(err.contains("failed to write config file"));
    }
}
