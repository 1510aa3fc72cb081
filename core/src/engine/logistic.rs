//! Multinomial logistic regression engine
//!
//! Pipeline: category -> label key, three numeric fields -> feature vector,
//! optional standardization, `linfa-logistic` multinomial trainer, and the
//! predicted key decoded back to its category name.

use std::fmt;

use linfa::prelude::*;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::{info, warn};

use crate::config::TrainingConfig;
use crate::engine::{
    evaluate_scored, ClassificationEngine, LabelEncoder, MulticlassEvaluation, ScoredRecord,
};
use crate::error::{ClassifierError, Result};
use crate::record::SupplierRecord;

const FEATURE_COUNT: usize = 3;

/// Per-feature z-score scaler
#[derive(Debug, Clone)]
struct FeatureScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FeatureScaler {
    fn fit(features: &Array2<f64>) -> Self {
        let mean = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(features.ncols()));
        // Constant columns are left unscaled
        let std = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
        Self { mean, std }
    }

    fn apply(&self, features: Array2<f64>) -> Array2<f64> {
        (features - &self.mean) / &self.std
    }
}

/// Trained multinomial logistic model
pub struct LogisticModel {
    fitted: MultiFittedLogisticRegression<f64, usize>,
    labels: LabelEncoder,
    scaler: Option<FeatureScaler>,
}

impl LogisticModel {
    /// Class probabilities for every row, with columns indexed by label key
    fn probabilities(&self, records: &[SupplierRecord]) -> Array2<f64> {
        let mut features = feature_matrix(records);
        if let Some(scaler) = &self.scaler {
            features = scaler.apply(features);
        }

        let scores = self.fitted.predict_probabilities(&features);

        // The fitted model orders columns by its own class list
        let mut by_key = Array2::zeros((records.len(), self.labels.len()));
        for (column, &key) in self.fitted.classes().iter().enumerate() {
            by_key.column_mut(key).assign(&scores.column(column));
        }
        by_key
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }
}

impl fmt::Debug for LogisticModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogisticModel")
            .field("labels", &self.labels.labels())
            .field("standardized", &self.scaler.is_some())
            .finish_non_exhaustive()
    }
}

/// [`ClassificationEngine`] backed by `linfa-logistic`
#[derive(Debug, Clone, Default)]
pub struct LogisticEngine {
    params: TrainingConfig,
}

impl LogisticEngine {
    pub fn new(params: TrainingConfig) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingConfig {
        &self.params
    }
}

impl ClassificationEngine for LogisticEngine {
    type Model = LogisticModel;

    fn fit(&self, records: &[SupplierRecord]) -> Result<LogisticModel> {
        info!(
            "Starting logistic regression training with {} samples and {} features",
            records.len(),
            FEATURE_COUNT
        );

        let categories = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record.category.as_deref().ok_or_else(|| {
                    ClassifierError::Engine(format!("training record {index} has no category"))
                })
            })
            .collect::<Result<Vec<&str>>>()?;

        let labels = LabelEncoder::fit(categories.iter().copied());
        if labels.len() < 2 {
            return Err(ClassifierError::Engine(format!(
                "at least two categories are required, found {}",
                labels.len()
            )));
        }

        let targets: Array1<usize> = categories
            .iter()
            .filter_map(|category| labels.encode(category))
            .collect();

        let mut features = feature_matrix(records);
        let scaler = self.params.standardize.then(|| FeatureScaler::fit(&features));
        if let Some(scaler) = &scaler {
            features = scaler.apply(features);
        }

        let dataset = Dataset::new(features, targets);

        let fitted = MultiLogisticRegression::new()
            .max_iterations(self.params.max_iterations)
            .alpha(self.params.alpha)
            .fit(&dataset)
            .map_err(|e| ClassifierError::Engine(format!("logistic regression: {e}")))?;

        info!(
            "Logistic regression training completed with {} classes",
            labels.len()
        );

        Ok(LogisticModel {
            fitted,
            labels,
            scaler,
        })
    }

    fn classes<'a>(&self, model: &'a LogisticModel) -> &'a [String] {
        model.labels.labels()
    }

    fn transform(
        &self,
        model: &LogisticModel,
        records: &[SupplierRecord],
    ) -> Result<Vec<ScoredRecord>> {
        let probabilities = model.probabilities(records);

        let mut scored = Vec::with_capacity(records.len());
        for (index, (record, row)) in records.iter().zip(probabilities.rows()).enumerate() {
            let actual = match record.category.as_deref() {
                Some(category) => match model.labels.encode(category) {
                    Some(key) => key,
                    None => {
                        warn!("Skipping row {index}: category '{category}' unknown to the model");
                        continue;
                    }
                },
                None => {
                    warn!("Skipping row {index}: no category");
                    continue;
                }
            };

            scored.push(ScoredRecord {
                actual,
                predicted: argmax(row),
                probabilities: row.to_vec(),
            });
        }

        Ok(scored)
    }

    fn predict(&self, model: &LogisticModel, record: &SupplierRecord) -> Result<String> {
        let probabilities = model.probabilities(std::slice::from_ref(record));
        let key = argmax(probabilities.row(0));

        model
            .labels
            .decode(key)
            .map(str::to_string)
            .ok_or_else(|| ClassifierError::Engine(format!("predicted unknown label key {key}")))
    }

    fn evaluate(&self, predictions: &[ScoredRecord]) -> Result<MulticlassEvaluation> {
        evaluate_scored(predictions)
    }
}

fn feature_matrix(records: &[SupplierRecord]) -> Array2<f64> {
    let mut features = Array2::zeros((records.len(), FEATURE_COUNT));
    for (mut row, record) in features.rows_mut().into_iter().zip(records) {
        row.assign(&ArrayView1::from(&record.features()));
    }
    features
}

fn argmax(row: ArrayView1<'_, f64>) -> usize {
    row.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
        .unwrap_or(0)
}
