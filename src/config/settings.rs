//! Gate settings loaded from JSON files or the environment.
//!
//! Settings only describe the minimum level; the logger itself is always
//! installed in code.

use std::{
    env::var,
    fs::read_to_string,
    io::Error as StdError,
    path::{Path, PathBuf},
};

use {
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str},
    thiserror::Error,
    tracing::debug,
};

use crate::log::{LevelParseError, LogGate, LogLevel};

/// Environment variable read by `GateSettings::from_env`.
pub const LOG_LEVEL_ENV: &str = "ERRGATE_LOG_LEVEL";

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read the settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {0}")]
    InvalidValue(#[from] LevelParseError),
}

/// Serializable gate configuration with default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Minimum severity forwarded to the logger.
    pub minimum_level: LogLevel,
}

impl GateSettings {
    /// Loads settings from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the settings file.
    ///
    /// # Returns
    ///
    /// The parsed settings, or the defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No gate settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        debug!("Loading gate settings from {:?}", path);
        let contents = read_to_string(path)?;
        Ok(from_str(&contents)?)
    }

    /// Loads the settings used when none are given explicitly.
    ///
    /// A non-empty `ERRGATE_LOG_LEVEL` wins; otherwise the file at
    /// `get_config_path()` is read (defaults if it does not exist).
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the variable names no level or the file
    /// cannot be read or parsed.
    pub fn load_default() -> Result<Self, SettingsError> {
        match Self::from_env()? {
            Some(settings) => Ok(settings),
            None => Self::load(get_config_path()),
        }
    }

    /// Reads settings from `ERRGATE_LOG_LEVEL`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the variable is unset or empty.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if the variable names no level.
    pub fn from_env() -> Result<Option<Self>, SettingsError> {
        match var(LOG_LEVEL_ENV) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(Self::from_level_str(&value)?)),
            _ => Ok(None),
        }
    }

    /// Parses settings from a level name such as `"warning"`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if `value` names no level.
    pub fn from_level_str(value: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            minimum_level: value.parse()?,
        })
    }

    /// Applies these settings to `gate`.
    pub fn apply(&self, gate: &LogGate) {
        debug!("Setting gate minimum level to {}", self.minimum_level);
        gate.set_minimum_level(self.minimum_level);
    }
}

/// Default location of the settings file following XDG conventions.
///
/// # Returns
///
/// `$XDG_CONFIG_HOME/errgate/settings.json`, falling back to
/// `$HOME/.config/errgate/settings.json`.
#[must_use]
pub fn get_config_path() -> PathBuf {
    config_path_from(var("XDG_CONFIG_HOME").ok(), var("HOME").ok())
}

fn config_path_from(config_home: Option<String>, home: Option<String>) -> PathBuf {
    let base = match (config_home, home) {
        (Some(config_home), _) if !config_home.is_empty() => PathBuf::from(config_home),
        (_, Some(home)) => PathBuf::from(home).join(".config"),
        _ => PathBuf::from("."),
    };
    base.join("errgate").join("settings.json")
}

#[cfg(test)]
mod tests {
    use std::{
        env::{remove_var, set_var},
        fs::{create_dir_all, write},
        path::PathBuf,
    };

    use {serde_json::from_str, tempfile::tempdir};

    use crate::{
        config::settings::{
            GateSettings, LOG_LEVEL_ENV, SettingsError, config_path_from, get_config_path,
        },
        log::{LogGate, LogLevel},
    };

    #[test]
    fn test_default_level_is_error() {
        assert_eq!(GateSettings::default().minimum_level, LogLevel::Error);
    }

    #[test]
    fn test_deserialize_with_alias() {
        let settings: GateSettings = from_str(r#"{ "minimum_level": "warn" }"#).unwrap();
        assert_eq!(settings.minimum_level, LogLevel::Warning);

        let empty: GateSettings = from_str("{}").unwrap();
        assert_eq!(empty, GateSettings::default());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let settings = GateSettings::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, GateSettings::default());
    }

    #[test]
    fn test_load_and_apply() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, r#"{ "minimum_level": "debug" }"#).unwrap();

        let settings = GateSettings::load(&path).unwrap();
        let gate = LogGate::new();
        settings.apply(&gate);
        assert_eq!(gate.minimum_level(), LogLevel::Debug);
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, "{ not json").unwrap();

        let error = GateSettings::load(&path).unwrap_err();
        assert!(matches!(error, SettingsError::SerializationError(_)));
        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_from_level_str() {
        assert_eq!(
            GateSettings::from_level_str("info").unwrap().minimum_level,
            LogLevel::Info
        );
        let error = GateSettings::from_level_str("loud").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid settings value: Unknown log level: loud"
        );
    }

    #[test]
    fn test_config_path_resolution() {
        assert_eq!(
            config_path_from(Some("/xdg".to_string()), Some("/home/me".to_string())),
            PathBuf::from("/xdg/errgate/settings.json")
        );
        assert_eq!(
            config_path_from(Some(String::new()), Some("/home/me".to_string())),
            PathBuf::from("/home/me/.config/errgate/settings.json")
        );
        assert_eq!(
            config_path_from(None, None),
            PathBuf::from("./errgate/settings.json")
        );
    }

    // Only test that mutates the process environment.
    #[test]
    fn test_environment_sources() {
        let dir = tempdir().unwrap();
        let settings_dir = dir.path().join("errgate");
        create_dir_all(&settings_dir).unwrap();
        write(
            settings_dir.join("settings.json"),
            r#"{ "minimum_level": "info" }"#,
        )
        .unwrap();

        unsafe {
            set_var("XDG_CONFIG_HOME", dir.path());
            remove_var(LOG_LEVEL_ENV);
        }
        assert_eq!(get_config_path(), settings_dir.join("settings.json"));
        assert!(GateSettings::from_env().unwrap().is_none());
        assert_eq!(
            GateSettings::load_default().unwrap().minimum_level,
            LogLevel::Info
        );

        unsafe { set_var(LOG_LEVEL_ENV, "  ") };
        assert!(GateSettings::from_env().unwrap().is_none());

        unsafe { set_var(LOG_LEVEL_ENV, "Warning") };
        assert_eq!(
            GateSettings::from_env().unwrap().map(|settings| settings.minimum_level),
            Some(LogLevel::Warning)
        );
        assert_eq!(
            GateSettings::load_default().unwrap().minimum_level,
            LogLevel::Warning
        );

        unsafe { set_var(LOG_LEVEL_ENV, "verbose") };
        assert!(matches!(
            GateSettings::from_env(),
            Err(SettingsError::InvalidValue(_))
        ));
        assert!(GateSettings::load_default().is_err());

        unsafe {
            remove_var(LOG_LEVEL_ENV);
            remove_var("XDG_CONFIG_HOME");
        }
    }
}
