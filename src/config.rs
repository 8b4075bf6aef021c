// Configuration loaded from YAML with built-in defaults

use crate::persist::DEFAULT_KEY;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Storage backend used by the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
}

impl std::str::FromStr for Backend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(eyre!("Unknown backend: {} (expected file or sqlite)", other)),
        }
    }
}

/// Application configuration
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `.todostore/`
    pub store_path: PathBuf,
    pub backend: Backend,
    /// Storage key the task array lives under
    pub key: String,
    /// error, warn, info, debug or trace
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            backend: Backend::default(),
            key: DEFAULT_KEY.to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` if given, else the user config file if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match user_config_path() {
            Some(user_config) if user_config.exists() => Self::from_file(&user_config),
            _ => Ok(Self::default()),
        }
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.log_level()?;
        Ok(config)
    }

    /// Parsed `log_level`
    pub fn log_level(&self) -> Result<Level> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| eyre!("Invalid log level: {}", self.log_level))
    }
}

/// `<data dir>/todostore`, or the current directory when there is no data dir
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("todostore"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `<config dir>/todostore/config.yaml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("todostore").join("config.yaml"))
}
