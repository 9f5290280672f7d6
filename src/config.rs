use std::{env, fs, path::PathBuf};

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::{reminders::DUE_TODAY_LIMIT, stats::RECENT_LIMIT};

const APP_NAME: &str = "orderflow";
/// Points at a config file, checked when `--config` is not given
pub const CONFIG_ENV: &str = "ORDERFLOW_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown time zone '{name}': {source}")]
    UnknownTimeZone {
        name: String,
        #[source]
        source: jiff::Error,
    },

    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the order and theme files live
    pub data_dir: Option<PathBuf>,
    /// IANA zone name; the system zone when unset
    pub time_zone: Option<String>,
    pub due_today_limit: usize,
    pub recent_limit: usize,
    pub watch_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            time_zone: None,
            due_today_limit: DUE_TODAY_LIMIT,
            recent_limit: RECENT_LIMIT,
            watch_interval_secs: 1,
        }
    }
}

impl AppConfig {
    /// Load from `explicit`, then `$ORDERFLOW_CONFIG`, then the platform config dir.
    /// A missing file at the default location yields the defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let from_user = explicit.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        let required = from_user.is_some();
        let Some(path) = from_user.or_else(default_config_path) else {
            return Ok(Self::default());
        };

        match fs::read_to_string(&path) {
            Ok(raw) => {
                let config = Self::from_toml(&raw).map_err(|e| ConfigError::ParseFailed {
                    path: path.clone(),
                    source: e,
                })?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::ReadFailed { path, source: e }),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn resolve_data_dir(&self, override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        override_dir
            .or_else(|| self.data_dir.clone())
            .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_NAME)))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn resolve_time_zone(&self) -> Result<TimeZone, ConfigError> {
        match &self.time_zone {
            Some(name) => TimeZone::get(name).map_err(|e| ConfigError::UnknownTimeZone {
                name: name.clone(),
                source: e,
            }),
            None => Ok(TimeZone::system()),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
}
