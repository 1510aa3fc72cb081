//! Configuration Management Module
//!
//! Service configuration is read from an optional TOML file. Every field has
//! a default, so a missing file or a partial file is valid.

use std::path::{Path, PathBuf};

use ::config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Trainer hyperparameters
    pub training: TrainingConfig,
    /// Uploaded dataset handling
    pub upload: UploadConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Hyperparameters for the multinomial logistic trainer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Optimizer iteration cap
    pub max_iterations: u64,
    /// L2 regularization strength
    pub alpha: f64,
    /// Standardize features using statistics learned at fit time
    pub standardize: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            alpha: 1e-4,
            standardize: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded datasets are written to before training
    pub directory: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Optional log file; stdout when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration, falling back to defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config: Self = builder.build()?.try_deserialize()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
