use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::session::{
    SessionConfig, DEFAULT_REFILL_POLL_SECS, DEFAULT_SEQUENCE_LENGTH, DEFAULT_SESSION_SECS,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub sequence_length: usize,
    pub session_duration_secs: u64,
    pub refill_poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            session_duration_secs: DEFAULT_SESSION_SECS,
            refill_poll_interval_secs: DEFAULT_REFILL_POLL_SECS,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let config = SessionConfig {
            sequence_length: self.sequence_length,
            session_duration: Duration::from_secs(self.session_duration_secs),
            refill_poll_interval: Duration::from_secs(self.refill_poll_interval_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "klavye") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("klavye_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
