use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::BridgeConfig;

/// Why a bridge config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read bridge config {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bridge config {path} is not valid TOML: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid bridge config: {message}")]
    ValidationError { message: String },
}

impl BridgeConfig {
    /// `storebridge/config.toml` under the platform config directory, or
    /// under the working directory when the platform has none.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("storebridge").join("config.toml")
    }

    /// Bridge settings for this user. A bridge without a config file runs
    /// lenient, on `store-sync:` channels.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Err(ConfigError::ReadError { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "no bridge config, using defaults");
                Ok(BridgeConfig::default())
            }
            result => result,
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BridgeConfig = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the bridge cannot run with: an empty channel prefix
    /// would make channel names collide with bare store ids, a zero buffer
    /// cannot hold a message, and a reload needs an event to announce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "channel_prefix must not be empty".to_string(),
            });
        }

        if self.inbound_buffer == 0 {
            return Err(ConfigError::ValidationError {
                message: "inbound_buffer must be at least 1".to_string(),
            });
        }

        if self.hmr.completion_event.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "hmr.completion_event must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
