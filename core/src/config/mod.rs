//! Routine configuration persistence and validation
//!
//! The types live in liftcue-types; this module adds loading from the
//! per-user config directory or an explicit TOML file.

mod error;

use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use liftcue_types::{CountDirection, RoutineConfig, VoiceSettings};

const APP_NAME: &str = "liftcue";
const CONFIG_NAME: &str = "routine";

/// Extension trait for RoutineConfig persistence
pub trait RoutineConfigExt: Sized {
    /// Per-user config, or defaults if it cannot be read
    fn load() -> Self;
    fn load_from_path(path: &Path) -> Result<Self, ConfigError>;
    /// Store as the per-user config
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to_path(&self, path: &Path) -> Result<(), ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl RoutineConfigExt for RoutineConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load routine config, using defaults");
                Self::default()
            }
        }
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)?;
        tracing::info!("routine config saved");
        Ok(())
    }

    fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFile {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, contents).map_err(|source| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "routine config saved");
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sets == 0 {
            return Err(invalid("sets", "must be at least 1"));
        }
        if self.reps_per_side == 0 {
            return Err(invalid("reps_per_side", "must be at least 1"));
        }

        let voice = &self.voice;
        check_range("voice.instruction_rate", voice.instruction_rate, 0.0, 2.0)?;
        check_range("voice.count_rate", voice.count_rate, 0.0, 2.0)?;
        check_range("voice.pitch", voice.pitch, 0.0, 2.0)?;
        check_range("voice.volume", voice.volume, 0.0, 1.0)?;
        if voice.language.trim().is_empty() {
            return Err(invalid("voice.language", "must not be empty"));
        }
        Ok(())
    }
}

/// Where `RoutineConfigExt::load` reads from
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside {min}..={max}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RoutineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sets_rejected() {
        let config = RoutineConfig {
            sets: 0,
            ..RoutineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sets", .. }));
    }

    #[test]
    fn test_zero_reps_rejected() {
        let config = RoutineConfig {
            reps_per_side: 0,
            ..RoutineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "reps_per_side",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_durations_allowed() {
        let config = RoutineConfig {
            lift_seconds: 0,
            lower_seconds: 0,
            prep_seconds: 0,
            posture_seconds: 0,
            ..RoutineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_voice_ranges() {
        let mut config = RoutineConfig::default();
        config.voice.volume = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("voice.volume"));

        let mut config = RoutineConfig::default();
        config.voice.pitch = 2.0;
        assert!(config.validate().is_ok());
        config.voice.count_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "sets = 2\ncount_direction = \"descending\"\n\n[voice]\nlanguage = \"ko-KR\""
        )
        .unwrap();

        let config = RoutineConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.sets, 2);
        assert_eq!(config.count_direction, CountDirection::Descending);
        assert_eq!(config.language_tag(), "ko-KR");
        // Unlisted fields keep their defaults
        assert_eq!(config.reps_per_side, 5);
        assert!(config.voice.enabled);
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = RoutineConfig::load_from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_from_malformed_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sets = \"three\"").unwrap();
        let err = RoutineConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("routine.toml");
        let mut config = RoutineConfig {
            sets: 4,
            lift_seconds: 7,
            count_direction: CountDirection::Descending,
            ..RoutineConfig::default()
        };
        config.voice.language = "ko-KR".to_string();

        config.save_to_path(&path).unwrap();

        assert_eq!(RoutineConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_save_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = RoutineConfig::default().save_to_path(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::WriteFile { .. }));
    }
}
