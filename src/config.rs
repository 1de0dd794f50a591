//! TOML configuration loaded from the user config directory.
//!
//! A default `config.toml` is written on first run. Out-of-range poller
//! values are corrected at load time rather than rejected, so a hand-edited
//! config can never keep the poller from starting.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::poller::input_poller::PollerSettings;

const CONFIG_DIR: &str = "padstream";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine a config directory for this platform")]
    NoConfigDir,

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadstreamConfig {
    pub poller: PollerSettings,

    /// Default tracing filter, overridable via `RUST_LOG`.
    pub log_filter: String,
}

impl Default for PadstreamConfig {
    fn default() -> Self {
        Self {
            poller: PollerSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl PadstreamConfig {
    fn sanitized(mut self) -> Self {
        self.poller = self.poller.sanitized();
        self
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Writes the default config if none exists yet. Returns the config path.
pub fn ensure_default_config() -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(&PadstreamConfig::default())?;
        fs::write(&path, rendered)?;
        info!("Wrote default config to {}", path.display());
    }
    Ok(path)
}

/// Loads the config, creating the default file on first run.
pub fn load() -> Result<PadstreamConfig, ConfigError> {
    let path = ensure_default_config()?;
    let raw = fs::read_to_string(&path)?;
    let config: PadstreamConfig = toml::from_str(&raw)?;
    debug!("Loaded config from {}: {:?}", path.display(), config);
    Ok(config.sanitized())
}
