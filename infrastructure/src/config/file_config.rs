//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! connect_timeout_seconds = 10
//!
//! [models]
//! default = "llama3.2"
//!
//! [stream]
//! decode = "strict"
//!
//! [health]
//! poll_interval_seconds = 300
//!
//! [output]
//! format = "json"
//! color = false
//!
//! [logging]
//! transcript = "~/.local/share/ragdash/sessions.jsonl"
//! ```

use ragdash_domain::{DecodeMode, Model, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("api.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("api.base_url must start with http:// or https:// (got '{0}')")]
    InvalidBaseUrl(String),

    #[error("api.connect_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("health.poll_interval_seconds cannot be 0")]
    InvalidPollInterval,

    #[error("model name cannot be empty")]
    EmptyModelName,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL the API paths are appended to
    pub base_url: String,
    /// Connect timeout; streams themselves are never timed out
    pub connect_timeout_seconds: Option<u64>,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout_seconds: None,
        }
    }
}

impl FileApiConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_seconds.map(Duration::from_secs)
    }
}

/// Model selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Model used when `--model` is not given
    pub default: Model,
}

/// Stream decoding behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    pub decode: DecodeMode,
}

/// Health polling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHealthConfig {
    pub poll_interval_seconds: u64,
}

impl Default for FileHealthConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 300,
        }
    }
}

impl FileHealthConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Session transcript settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving session lifecycle events; disabled when unset
    pub transcript: Option<PathBuf>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api: FileApiConfig,
    pub models: FileModelsConfig,
    pub stream: FileStreamConfig,
    pub health: FileHealthConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidBaseUrl(base_url.to_string()));
        }

        if let Some(0) = self.api.connect_timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.health.poll_interval_seconds == 0 {
            return Err(ConfigValidationError::InvalidPollInterval);
        }

        if self.models.default.as_str().trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
