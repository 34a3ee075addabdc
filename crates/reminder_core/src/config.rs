//! Runtime configuration for core callers.
//!
//! Resolution order per field: explicit override, environment variable,
//! platform default.
//!
//! | field       | env var              | default                         |
//! |-------------|----------------------|---------------------------------|
//! | `data_dir`  | `REMINDER_DATA_DIR`  | per-user app data directory     |
//! | `log_level` | `REMINDER_LOG_LEVEL` | `debug` (debug) / `info` (release) |
//! | `log_dir`   | `REMINDER_LOG_DIR`   | `<data_dir>/logs`               |

use crate::logging::{default_log_level, normalize_level};
use crate::store::location::StorageLocation;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "REMINDER_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "REMINDER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "REMINDER_LOG_DIR";

const LOG_SUBDIR: &str = "logs";

/// Caller-supplied values that win over environment and defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Absolute directory holding `notes.json` and `reminders.json`.
    pub data_dir: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    /// No override, no env var, and the platform has no home directory.
    NoPlatformDataDir,
    InvalidLogLevel(String),
    InvalidPath {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPlatformDataDir => write!(
                f,
                "no data directory configured and none available for this platform; set {DATA_DIR_ENV}"
            ),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidPath { path, source } => {
                write!(f, "cannot resolve path `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPath { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from overrides and the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves configuration with an injected environment lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = match overrides
            .data_dir
            .or_else(|| lookup(DATA_DIR_ENV).map(PathBuf::from))
        {
            Some(path) => path,
            None => StorageLocation::platform_default()
                .ok_or(ConfigError::NoPlatformDataDir)?
                .root()
                .to_path_buf(),
        };
        let data_dir = absolutize(&data_dir)?;

        let log_level = match overrides.log_level.or_else(|| lookup(LOG_LEVEL_ENV)) {
            Some(level) => {
                normalize_level(&level).map_err(|_| ConfigError::InvalidLogLevel(level))?
            }
            None => default_log_level(),
        };

        let log_dir = match overrides
            .log_dir
            .or_else(|| lookup(LOG_DIR_ENV).map(PathBuf::from))
        {
            Some(path) => absolutize(&path)?,
            None => data_dir.join(LOG_SUBDIR),
        };

        Ok(Self {
            data_dir,
            log_level,
            log_dir,
        })
    }

    /// Storage location rooted at `data_dir`.
    pub fn storage_location(&self) -> StorageLocation {
        StorageLocation::new(self.data_dir.clone())
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConfigOverrides, CoreConfig, DATA_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn overrides_win_over_environment() {
        let overrides = ConfigOverrides {
            data_dir: Some(PathBuf::from("/srv/override")),
            log_level: Some("WARN".to_string()),
            log_dir: None,
        };
        let config = CoreConfig::resolve_with(overrides, |key| match key {
            DATA_DIR_ENV => Some("/srv/env".to_string()),
            LOG_LEVEL_ENV => Some("trace".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/override"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, PathBuf::from("/srv/override/logs"));
    }

    #[test]
    fn environment_is_used_when_no_override() {
        let config = CoreConfig::resolve_with(ConfigOverrides::default(), |key| match key {
            DATA_DIR_ENV => Some("  /srv/env  ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/env"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(
            config.storage_location().notes_path(),
            PathBuf::from("/srv/env/notes.json")
        );
    }

    #[test]
    fn relative_data_dir_is_made_absolute() {
        let overrides = ConfigOverrides {
            data_dir: Some(PathBuf::from("relative/data")),
            ..ConfigOverrides::default()
        };
        let config = CoreConfig::resolve_with(overrides, no_env).unwrap();
        assert!(config.data_dir.is_absolute());
        assert!(config.data_dir.ends_with("relative/data"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let overrides = ConfigOverrides {
            data_dir: Some(PathBuf::from("/srv/data")),
            log_level: Some("loud".to_string()),
            ..ConfigOverrides::default()
        };
        let err = CoreConfig::resolve_with(overrides, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(level) if level == "loud"));
    }
}
