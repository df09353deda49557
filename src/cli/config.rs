//! Configuration management for salescast
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.salescast/config.toml

use crate::errors::{Result, SalesError};
use crate::features::FEATURE_COUNT;
use crate::models::{ModelSource, DEFAULT_MODEL_URL};
use crate::predict::ProbeSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration for salescast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub server: ServerConfig,
    pub probes: ProbeSettings,
    pub display: DisplayConfig,
}

/// Model artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub url: String,
    pub path: String,
    pub download_timeout_secs: u64,
    pub expected_features: usize,
}

/// Web UI listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Terminal output preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color_output: bool,
    pub show_progress_bars: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MODEL_URL.to_string(),
            path: "model.json".to_string(),
            download_timeout_secs: 300,
            expected_features: FEATURE_COUNT,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: true,
            show_progress_bars: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the file (or the standard location, or built-in defaults) without validating
    ///
    /// `doctor` uses this so a bad value shows up as a failed check.
    pub fn read(path: Option<PathBuf>) -> Result<Self> {
        match path.or_else(|| Self::default_path().filter(|p| p.exists())) {
            Some(config_path) => Self::read_file(&config_path),
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SalesError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| SalesError::ConfigError(format!("Failed to parse config: {}", e)))?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Standard config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".salescast").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SalesError::ConfigError("server.port must be greater than 0".to_string()));
        }

        if self.model.expected_features != FEATURE_COUNT {
            return Err(SalesError::ConfigError(format!(
                "model.expected_features must be {} (the form produces {} features)",
                FEATURE_COUNT, FEATURE_COUNT
            )));
        }

        if self.model.path.trim().is_empty() {
            return Err(SalesError::ConfigError("model.path must not be empty".to_string()));
        }

        if self.model.url.trim().is_empty() {
            return Err(SalesError::ConfigError("model.url must not be empty".to_string()));
        }

        if self.model.download_timeout_secs == 0 {
            return Err(SalesError::ConfigError(
                "model.download_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.probes.promo_target) {
            return Err(SalesError::ConfigError(
                "probes.promo_target must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.probes.min_delta.is_nan() || self.probes.min_delta < 0.0 {
            return Err(SalesError::ConfigError(
                "probes.min_delta must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SalesError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SalesError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SalesError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Resolved model file path
    pub fn model_path(&self) -> PathBuf {
        Self::expand_path(&self.model.path)
    }

    /// Address the web UI binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Artifact source for the model store
    pub fn model_source(&self) -> ModelSource {
        ModelSource {
            url: Some(self.model.url.clone()),
            path: self.model_path(),
            expected_features: self.model.expected_features,
            download_timeout: Duration::from_secs(self.model.download_timeout_secs),
        }
    }
}
