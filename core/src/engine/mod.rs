//! Classification Engine Module
//!
//! The learning algorithm is kept behind [`ClassificationEngine`], so the
//! classifier never depends on a concrete trainer.
//!
//! - `label`: category <-> key encoding
//! - `evaluation`: multiclass aggregates over scored records
//! - `logistic`: multinomial logistic regression backed by `linfa-logistic`

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::ConfusionMatrix;
use crate::record::SupplierRecord;

pub mod evaluation;
pub mod label;
pub mod logistic;

pub use evaluation::evaluate_scored;
pub use label::LabelEncoder;
pub use logistic::{LogisticEngine, LogisticModel};

/// One labelled record after it has passed through a trained model
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    /// Key of the true category
    pub actual: usize,
    /// Key of the predicted category
    pub predicted: usize,
    /// Class probabilities indexed by key
    pub probabilities: Vec<f64>,
}

/// Aggregate metrics produced by an engine for a set of scored records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticlassEvaluation {
    pub macro_accuracy: f64,
    pub micro_accuracy: f64,
    pub log_loss: f64,
    pub log_loss_reduction: f64,
    pub confusion_matrix: ConfusionMatrix,
}

/// Fit / transform / predict / evaluate capability set
///
/// Implementations are synchronous and CPU-bound; callers move them onto a
/// blocking thread.
pub trait ClassificationEngine: Send + Sync + 'static {
    /// Trained model handle, opaque to callers
    type Model: Send + Sync + 'static;

    /// Train a model from labelled records
    fn fit(&self, records: &[SupplierRecord]) -> Result<Self::Model>;

    /// Category names known to `model`, in key order
    fn classes<'a>(&self, model: &'a Self::Model) -> &'a [String];

    /// Score labelled records through `model`
    fn transform(&self, model: &Self::Model, records: &[SupplierRecord])
        -> Result<Vec<ScoredRecord>>;

    /// Predict the category of a single record
    fn predict(&self, model: &Self::Model, record: &SupplierRecord) -> Result<String>;

    /// Compute aggregate metrics for scored records
    fn evaluate(&self, predictions: &[ScoredRecord]) -> Result<MulticlassEvaluation>;
}
