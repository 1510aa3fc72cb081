//! API Server Module
//!
//! This module contains the server setup functionality for the API system.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{
    classify, evaluate, health_check, model_status, train_from_path, upload_and_train, ApiState,
    Classifier,
};
use crate::models::ApiConfig;

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ApiConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server around an existing classifier
    pub fn new(config: ApiConfig, classifier: Arc<Classifier>) -> Self {
        let state = Arc::new(ApiState {
            classifier,
            upload_dir: config.upload_dir.clone(),
        });

        Self { config, state }
    }

    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Start the API server
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting supplier classifier API server on {}:{}",
            self.config.host, self.config.port
        );

        let app = router(self.state.clone());

        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!(
            "Supplier classifier API server listening on {}",
            listener.local_addr()?
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        Ok(())
    }
}

/// Build the application router with the shared state
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Model operations
        .route("/api/model", get(model_status))
        .route("/api/model/upload", post(upload_and_train))
        .route("/api/model/train", post(train_from_path))
        .route("/api/model/classify", post(classify))
        .route("/api/model/evaluate", post(evaluate))
        // Health check
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
