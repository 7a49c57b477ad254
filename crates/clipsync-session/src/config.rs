//! Application configuration.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clipsync_assistant::{AssistantOptions, assistant::DEFAULT_AGENT_ID};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CLIPSYNC_CONFIG";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CLIPSYNC_DATA_DIR";

/// Label used for this device when none is configured.
pub const DEFAULT_DEVICE_NAME: &str = "This Device";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Assistant endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub agent_id: String,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787/api/agent".to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            timeout_secs: 60,
        }
    }
}

impl AssistantConfig {
    #[must_use]
    pub fn options(&self) -> AssistantOptions {
        AssistantOptions {
            agent_id: self.agent_id.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// UI server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Top-level configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSyncConfig {
    /// Where persisted slots (recent sessions) live.
    pub data_dir: PathBuf,
    pub device_name: String,
    /// Start with sample data shown.
    pub sample_mode: bool,
    pub log_level: String,
    pub assistant: AssistantConfig,
    pub server: ServerConfig,
}

impl Default for ClipSyncConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            sample_mode: false,
            log_level: "info".to_string(),
            assistant: AssistantConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clipsync")
}

impl ClipSyncConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the file named by `CLIPSYNC_CONFIG` (default `clipsync.toml`),
    /// then apply `CLIPSYNC_DATA_DIR`.
    ///
    /// # Errors
    /// Returns error if the configuration file cannot be read or parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from("clipsync.toml"), PathBuf::from);
        let mut config = Self::load(&path)?;
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ClipSyncConfig::from_toml(
            r#"
            device_name = "Laptop"

            [assistant]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.device_name, "Laptop");
        assert_eq!(config.assistant.timeout_secs, 5);
        assert_eq!(config.assistant.agent_id, DEFAULT_AGENT_ID);
        assert_eq!(config.server, ServerConfig::default());
        assert!(!config.sample_mode);
        assert_eq!(config.assistant.options().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ClipSyncConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ClipSyncConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "sample_mode = \"maybe\"").unwrap();
        assert!(matches!(ClipSyncConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
