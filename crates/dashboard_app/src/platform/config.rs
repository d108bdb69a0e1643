use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dashboard_engine::ApiSettings;
use dashboard_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    /// Fixed principal until the server grows authentication.
    pub user_id: u64,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log_destination: LogDestination,
    /// Where the log file and persisted filters live.
    pub state_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            api_base_url: api.base_url,
            user_id: 1,
            poll_interval_ms: dashboard_core::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            connect_timeout_ms: api.connect_timeout.as_millis() as u64,
            request_timeout_ms: api.request_timeout.as_millis() as u64,
            log_destination: LogDestination::File,
            state_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    /// A missing file yields the defaults; fields absent from the file keep theirs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
