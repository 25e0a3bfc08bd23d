//! Runtime configuration and defaults.
//!
//! Defaults are compile-time constants; deployment overrides come from
//! environment variables, and the CLI can override both.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Canonical collection file name inside the data directory.
pub const DATA_FILE_NAME: &str = "schools.json";

/// Data directory used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Log directory name inside the data directory.
pub const LOG_DIR_NAME: &str = "logs";

/// Records per page in list views.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Age after which a session snapshot is considered stale.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(60);

/// Maximum number of schools in one score comparison.
pub const MAX_COMPARE_SCHOOLS: usize = 5;

/// Number of entries in the recruitment ranking.
pub const RANKING_LIMIT: usize = 10;

pub const ENV_DATA_DIR: &str = "TIAOJI_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "TIAOJI_LOG_LEVEL";
pub const ENV_PAGE_SIZE: &str = "TIAOJI_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    CurrentDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}")
            }
            Self::CurrentDir(message) => {
                write!(f, "cannot resolve current directory: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    pub page_size: usize,
    pub snapshot_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: default_log_level(),
            page_size: DEFAULT_PAGE_SIZE,
            snapshot_ttl: DEFAULT_SNAPSHOT_TTL,
        }
    }
}

impl StoreConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: level.clone(),
            })?;
        }
        if let Some(raw) = get(ENV_PAGE_SIZE) {
            config.page_size = match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_PAGE_SIZE,
                        value: raw,
                    })
                }
            };
        }
        Ok(config)
    }

    /// Data directory as an absolute path (relative paths resolve against the
    /// current directory).
    pub fn absolute_data_dir(&self) -> Result<PathBuf, ConfigError> {
        if self.data_dir.is_absolute() {
            return Ok(self.data_dir.clone());
        }
        let cwd = std::env::current_dir().map_err(|err| ConfigError::CurrentDir(err.to_string()))?;
        Ok(cwd.join(&self.data_dir))
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE_NAME)
    }

    pub fn log_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.absolute_data_dir()?.join(LOG_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_PAGE_SIZE, ENV_PAGE_SIZE};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.data_file().ends_with("schools.json"));
    }

    #[test]
    fn overrides_are_trimmed_and_normalized() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("TIAOJI_DATA_DIR", " /srv/tiaoji "),
            ("TIAOJI_LOG_LEVEL", "WARNING"),
            ("TIAOJI_PAGE_SIZE", "12"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/tiaoji"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[("TIAOJI_PAGE_SIZE", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_PAGE_SIZE,
                value: "0".to_string()
            }
        );
    }
}
