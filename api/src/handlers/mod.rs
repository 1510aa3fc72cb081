//! API Handlers Module
//!
//! This module contains the request handlers for the API system.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Multipart, State},
    response::Json,
};
use uuid::Uuid;

use supplier_classifier_core::{
    ClassifierError, EvaluationReport, LogisticEngine, Prediction, SupplierClassifier,
    SupplierRecord,
};

use crate::error::ApiError;
use crate::models::{DatasetPathRequest, HealthResponse, ModelStatusResponse, TrainResponse};

/// Multipart field carrying the uploaded dataset
pub const UPLOAD_FIELD: &str = "file";

/// Classifier served by the API
pub type Classifier = SupplierClassifier<LogisticEngine>;

/// Represents the state of the API server
pub struct ApiState {
    /// The single model-owning classifier
    pub classifier: Arc<Classifier>,
    /// Directory uploaded datasets are staged in while training
    pub upload_dir: PathBuf,
}

/// Health check endpoint
#[debug_handler]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "supplier-classifier-api".to_string(),
    })
}

/// Upload a dataset and train on it
#[debug_handler]
pub async fn upload_and_train(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<TrainResponse>, ApiError> {
    tracing::debug!("Receiving dataset upload");

    let mut content = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
            content = Some(bytes);
            break;
        }
    }

    let content = match content {
        Some(bytes) if !bytes.is_empty() => bytes,
        Some(_) => return Err(ApiError::bad_request("uploaded file is empty")),
        None => {
            return Err(ApiError::bad_request(format!(
                "no file uploaded in field '{UPLOAD_FIELD}'"
            )))
        }
    };

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(ClassifierError::from)?;
    let path = state.upload_dir.join(format!("{}.csv", Uuid::new_v4()));
    tokio::fs::write(&path, &content)
        .await
        .map_err(ClassifierError::from)?;
    tracing::info!("Staged upload of {} bytes at {}", content.len(), path.display());

    let trained = state.classifier.train(&path).await;

    // The staged file is removed whether or not training succeeded
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Failed to remove staged upload {}: {}", path.display(), e);
    }

    Ok(Json(TrainResponse::trained(trained?)))
}

/// Train from a dataset already on the server
#[debug_handler]
pub async fn train_from_path(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<DatasetPathRequest>,
) -> Result<Json<TrainResponse>, ApiError> {
    tracing::debug!("Training from path: {}", request.path.display());

    let model = state.classifier.train(&request.path).await?;
    Ok(Json(TrainResponse::trained(model)))
}

/// Classify a single supplier record
#[debug_handler]
pub async fn classify(
    State(state): State<Arc<ApiState>>,
    Json(record): Json<SupplierRecord>,
) -> Result<Json<Prediction>, ApiError> {
    tracing::debug!("Classifying record: {:?}", record);

    let prediction = state.classifier.classify(&record).await?;
    Ok(Json(prediction))
}

/// Evaluate the current model against a labelled dataset
#[debug_handler]
pub async fn evaluate(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<DatasetPathRequest>,
) -> Result<Json<EvaluationReport>, ApiError> {
    tracing::debug!("Evaluating against: {}", request.path.display());

    let report = state.classifier.evaluate(&request.path).await?;
    Ok(Json(report))
}

/// Current model state
#[debug_handler]
pub async fn model_status(State(state): State<Arc<ApiState>>) -> Json<ModelStatusResponse> {
    tracing::debug!("Reading model status");

    Json(ModelStatusResponse {
        state: state.classifier.state().await,
        model: state.classifier.summary().await,
    })
}
