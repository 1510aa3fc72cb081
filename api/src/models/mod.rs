//! API Models Module
//!
//! Request and response bodies plus the server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use supplier_classifier_core::{ModelSummary, ServiceConfig, TrainerState};

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Directory uploaded datasets are staged in
    pub upload_dir: PathBuf,
}

impl From<&ServiceConfig> for ApiConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            upload_dir: config.upload.directory.clone(),
        }
    }
}

/// Body naming a dataset file on the server's filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetPathRequest {
    pub path: PathBuf,
}

/// Response to a successful training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub success: bool,
    pub message: String,
    pub model: ModelSummary,
}

impl TrainResponse {
    pub fn trained(model: ModelSummary) -> Self {
        Self {
            success: true,
            message: format!("Model trained on {} rows", model.training_rows),
            model,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatusResponse {
    pub state: TrainerState,
    pub model: Option<ModelSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
