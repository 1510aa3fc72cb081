//! Supplier Classifier Core Module
//!
//! Records, dataset parsing, the training engine, the model-owning
//! classifier and evaluation metrics for the supplier classification service.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod record;

pub use classifier::{EvaluationReport, ModelSummary, SupplierClassifier, TrainerState};
pub use config::{LoggingConfig, ServerConfig, ServiceConfig, TrainingConfig, UploadConfig};
pub use dataset::{load_dataset, parse_records};
pub use engine::{ClassificationEngine, LogisticEngine, LogisticModel, MulticlassEvaluation};
pub use error::{ClassifierError, Result};
pub use metrics::{per_class_metrics, per_class_metrics_from_counts, ClassMetrics, ConfusionMatrix};
pub use record::{Prediction, SupplierRecord};
