//! Command-line arguments and config overrides

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use liftcue_core::{ConfigError, CountDirection, RoutineConfig, RoutineConfigExt};

#[derive(Debug, Parser)]
#[command(version, about = "Narrated seated leg-raise routine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Mode>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// TTS program (espeak-ng argument convention); on Windows and macOS
    /// only used when the system voice is unavailable
    #[arg(long, global = true, default_value = "espeak-ng")]
    pub speech_program: String,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Run one session and exit
    Run,
    /// Open the interactive prompt (default)
    Repl,
}

/// Settings applied on top of the loaded config file
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Read the routine from this TOML file instead of the user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub sets: Option<u32>,

    /// Repetitions per side
    #[arg(long, global = true)]
    pub reps: Option<u32>,

    /// Seconds holding the leg up
    #[arg(long, global = true)]
    pub lift: Option<u32>,

    /// Seconds lowering the leg
    #[arg(long, global = true)]
    pub lower: Option<u32>,

    /// Seconds of preparation before each set
    #[arg(long, global = true)]
    pub prep: Option<u32>,

    /// Seconds of posture guidance at the start
    #[arg(long, global = true)]
    pub posture: Option<u32>,

    #[arg(long, global = true)]
    pub no_voice: bool,

    /// BCP 47 language tag, e.g. en-GB or ko-KR
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Count remaining seconds instead of elapsed ones
    #[arg(long, global = true)]
    pub descending: bool,
}

impl Overrides {
    /// Load the base config, apply the overrides and validate the result
    pub fn resolve(&self) -> Result<RoutineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RoutineConfig::load_from_path(path)?,
            None => RoutineConfig::load(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut RoutineConfig) {
        let durations = [
            (self.sets, &mut config.sets),
            (self.reps, &mut config.reps_per_side),
            (self.lift, &mut config.lift_seconds),
            (self.lower, &mut config.lower_seconds),
            (self.prep, &mut config.prep_seconds),
            (self.posture, &mut config.posture_seconds),
        ];
        for (value, field) in durations {
            if let Some(value) = value {
                *field = value;
            }
        }

        if self.no_voice {
            config.voice.enabled = false;
        }
        if let Some(lang) = &self.lang {
            config.voice.language = lang.clone();
        }
        if self.descending {
            config.count_direction = CountDirection::Descending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = RoutineConfig::default();
        Overrides::default().apply(&mut config);
        assert_eq!(config, RoutineConfig::default());
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::try_parse_from([
            "liftcue",
            "run",
            "--sets",
            "1",
            "--reps",
            "2",
            "--posture",
            "0",
            "--no-voice",
            "--lang",
            "ko-KR",
            "--descending",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Mode::Run)));

        let mut config = RoutineConfig::default();
        cli.overrides.apply(&mut config);
        assert_eq!(config.sets, 1);
        assert_eq!(config.reps_per_side, 2);
        assert_eq!(config.posture_seconds, 0);
        assert_eq!(config.lift_seconds, 5);
        assert!(!config.voice_enabled());
        assert_eq!(config.language_tag(), "ko-KR");
        assert_eq!(config.count_direction, CountDirection::Descending);
    }

    #[test]
    fn test_default_speech_program() {
        let cli = Cli::try_parse_from(["liftcue"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.speech_program, "espeak-ng");
    }

    #[test]
    fn test_missing_config_file_rejected() {
        let overrides = Overrides {
            config: Some(PathBuf::from("/nonexistent/liftcue/routine.toml")),
            ..Overrides::default()
        };
        assert!(matches!(
            overrides.resolve(),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}
