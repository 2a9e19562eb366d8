use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console_engine::{ApiSettings, TransportSettings, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "console.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for one console run, read from a RON file.
///
/// Missing fields take their defaults, so a file may set only what differs:
///
/// ```ron
/// (
///     base_url: "http://10.0.0.5:5000",
///     request_timeout_secs: Some(30),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    /// How long the event loop waits for engine events before a `Tick`.
    pub render_tick_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            request_timeout_secs: None,
            output_dir: PathBuf::from("output"),
            log_destination: LogDestination::File,
            render_tick_ms: 75,
        }
    }
}

impl ConsoleConfig {
    /// Loads `explicit` if given (it must exist), else `console.ron` when
    /// present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.render_tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "render_tick_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..ApiSettings::default()
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn render_tick(&self) -> Duration {
        Duration::from_millis(self.render_tick_ms)
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub log_destination: Option<LogDestination>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut ConsoleConfig) -> Result<(), ConfigError> {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(destination) = self.log_destination {
            config.log_destination = destination;
        }
        config.validate()
    }
}
