//! Supplier Classifier
//!
//! Owns the single model slot and mediates every model operation. The slot
//! sits behind one async mutex held for the whole of train, classify and
//! evaluate: concurrent trains serialize, and readers never observe a model
//! that is being replaced. Re-training replaces the model wholesale.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dataset::load_dataset;
use crate::engine::ClassificationEngine;
use crate::error::{ClassifierError, Result};
use crate::metrics::{per_class_metrics, ClassMetrics, ConfusionMatrix};
use crate::record::{Prediction, SupplierRecord};

/// Model lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainerState {
    Untrained,
    Trained,
}

/// Description of the model currently held by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub training_rows: usize,
    pub classes: Vec<String>,
}

/// Evaluation result returned to callers
///
/// Aggregates come from the engine unmodified; per-class metrics are derived
/// from the confusion matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub macro_accuracy: f64,
    pub micro_accuracy: f64,
    pub log_loss: f64,
    pub log_loss_reduction: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub per_class_metrics: Vec<ClassMetrics>,
}

enum ModelSlot<M> {
    Untrained,
    Trained { model: Arc<M>, summary: ModelSummary },
}

impl<M> ModelSlot<M> {
    fn model(&self) -> Result<&Arc<M>> {
        match self {
            ModelSlot::Untrained => Err(ClassifierError::ModelNotTrained),
            ModelSlot::Trained { model, .. } => Ok(model),
        }
    }
}

/// Trainer and classifier over a [`ClassificationEngine`]
pub struct SupplierClassifier<E: ClassificationEngine> {
    engine: Arc<E>,
    slot: Mutex<ModelSlot<E::Model>>,
}

impl<E: ClassificationEngine> SupplierClassifier<E> {
    /// Create an untrained classifier
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
            slot: Mutex::new(ModelSlot::Untrained),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current lifecycle state
    pub async fn state(&self) -> TrainerState {
        match &*self.slot.lock().await {
            ModelSlot::Untrained => TrainerState::Untrained,
            ModelSlot::Trained { .. } => TrainerState::Trained,
        }
    }

    /// Summary of the current model, if any
    pub async fn summary(&self) -> Option<ModelSummary> {
        match &*self.slot.lock().await {
            ModelSlot::Untrained => None,
            ModelSlot::Trained { summary, .. } => Some(summary.clone()),
        }
    }

    /// Train from a dataset file and replace the current model
    pub async fn train(&self, dataset_path: impl AsRef<Path>) -> Result<ModelSummary> {
        let dataset_path = dataset_path.as_ref();
        info!("Training model from {}", dataset_path.display());

        let records = load_dataset(dataset_path).await?;
        self.train_from_records(records).await
    }

    /// Train from parsed records and replace the current model
    ///
    /// On failure the previous model, if any, stays in place.
    pub async fn train_from_records(&self, records: Vec<SupplierRecord>) -> Result<ModelSummary> {
        let mut slot = self.slot.lock().await;

        let training_rows = records.len();
        let engine = Arc::clone(&self.engine);
        let model = tokio::task::spawn_blocking(move || engine.fit(&records))
            .await
            .map_err(|e| ClassifierError::Engine(format!("training task failed: {e}")))??;

        let summary = ModelSummary {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            training_rows,
            classes: self.engine.classes(&model).to_vec(),
        };

        if let ModelSlot::Trained {
            summary: previous, ..
        } = &*slot
        {
            info!(
                "Replacing model {} with {}",
                previous.model_id, summary.model_id
            );
        }

        info!(
            "Model {} trained on {} rows with classes {:?}",
            summary.model_id, summary.training_rows, summary.classes
        );

        *slot = ModelSlot::Trained {
            model: Arc::new(model),
            summary: summary.clone(),
        };

        Ok(summary)
    }

    /// Predict the category of one record
    pub async fn classify(&self, record: &SupplierRecord) -> Result<Prediction> {
        let slot = self.slot.lock().await;
        let model = slot.model()?;

        let predicted_category = self.engine.predict(model, record)?;
        debug!("Classified {:?} as {}", record, predicted_category);

        Ok(Prediction { predicted_category })
    }

    /// Evaluate the current model against a labelled dataset file
    pub async fn evaluate(&self, test_dataset_path: impl AsRef<Path>) -> Result<EvaluationReport> {
        if self.state().await == TrainerState::Untrained {
            return Err(ClassifierError::ModelNotTrained);
        }

        let test_dataset_path = test_dataset_path.as_ref();
        info!("Evaluating model against {}", test_dataset_path.display());

        let records = load_dataset(test_dataset_path).await?;
        self.evaluate_records(records).await
    }

    /// Evaluate the current model against labelled records
    pub async fn evaluate_records(&self, records: Vec<SupplierRecord>) -> Result<EvaluationReport> {
        let slot = self.slot.lock().await;
        let model = Arc::clone(slot.model()?);

        let engine = Arc::clone(&self.engine);
        let evaluation = tokio::task::spawn_blocking(move || {
            let scored = engine.transform(&model, &records)?;
            engine.evaluate(&scored)
        })
        .await
        .map_err(|e| ClassifierError::Engine(format!("evaluation task failed: {e}")))??;

        let per_class_metrics = per_class_metrics(&evaluation.confusion_matrix);

        info!(
            "Evaluation finished: micro accuracy {:.3}, macro accuracy {:.3}, log loss {:.3}",
            evaluation.micro_accuracy, evaluation.macro_accuracy, evaluation.log_loss
        );

        Ok(EvaluationReport {
            macro_accuracy: evaluation.macro_accuracy,
            micro_accuracy: evaluation.micro_accuracy,
            log_loss: evaluation.log_loss,
            log_loss_reduction: evaluation.log_loss_reduction,
            confusion_matrix: evaluation.confusion_matrix,
            per_class_metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{evaluate_scored, LabelEncoder, MulticlassEvaluation, ScoredRecord};
    use std::io::Write;

    /// Predicts the most frequent training category for every record
    struct MajorityEngine;

    struct MajorityModel {
        labels: LabelEncoder,
        majority: usize,
    }

    impl ClassificationEngine for MajorityEngine {
        type Model = MajorityModel;

        fn fit(&self, records: &[SupplierRecord]) -> Result<MajorityModel> {
            let labels =
                LabelEncoder::fit(records.iter().filter_map(|r| r.category.as_deref()));
            let mut counts = vec![0usize; labels.len()];
            for record in records {
                if let Some(key) = record.category.as_deref().and_then(|c| labels.encode(c)) {
                    counts[key] += 1;
                }
            }
            let majority = counts
                .iter()
                .enumerate()
                .max_by_key(|(_, count)| **count)
                .map(|(key, _)| key)
                .ok_or_else(|| ClassifierError::Engine("no categories".to_string()))?;
            Ok(MajorityModel { labels, majority })
        }

        fn classes<'a>(&self, model: &'a MajorityModel) -> &'a [String] {
            model.labels.labels()
        }

        fn transform(
            &self,
            model: &MajorityModel,
            records: &[SupplierRecord],
        ) -> Result<Vec<ScoredRecord>> {
            let n = model.labels.len();
            Ok(records
                .iter()
                .filter_map(|r| r.category.as_deref().and_then(|c| model.labels.encode(c)))
                .map(|actual| {
                    let mut probabilities = vec![0.0; n];
                    probabilities[model.majority] = 1.0;
                    ScoredRecord {
                        actual,
                        predicted: model.majority,
                        probabilities,
                    }
                })
                .collect())
        }

        fn predict(&self, model: &MajorityModel, _record: &SupplierRecord) -> Result<String> {
            Ok(model.labels.labels()[model.majority].clone())
        }

        fn evaluate(&self, predictions: &[ScoredRecord]) -> Result<MulticlassEvaluation> {
            evaluate_scored(predictions)
        }
    }

    fn labelled(categories: &[&str]) -> Vec<SupplierRecord> {
        categories
            .iter()
            .map(|c| SupplierRecord::new(1.0, 2.0, 3.0).with_category(*c))
            .collect()
    }

    fn write_dataset(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_classify_before_training_fails() {
        let classifier = SupplierClassifier::new(MajorityEngine);

        assert_eq!(classifier.state().await, TrainerState::Untrained);
        assert!(classifier.summary().await.is_none());

        let err = classifier
            .classify(&SupplierRecord::new(1.0, 2.0, 3.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::ModelNotTrained));
    }

    #[tokio::test]
    async fn test_train_then_classify() {
        let classifier = SupplierClassifier::new(MajorityEngine);

        let summary = classifier
            .train_from_records(labelled(&["A", "B", "A"]))
            .await
            .unwrap();
        assert_eq!(summary.training_rows, 3);
        assert_eq!(summary.classes, vec!["A", "B"]);
        assert_eq!(classifier.state().await, TrainerState::Trained);

        let prediction = classifier
            .classify(&SupplierRecord::new(1.0, 2.0, 3.0))
            .await
            .unwrap();
        assert_eq!(prediction.predicted_category, "A");
    }

    #[tokio::test]
    async fn test_retraining_replaces_model() {
        let classifier = SupplierClassifier::new(MajorityEngine);
        let record = SupplierRecord::new(1.0, 2.0, 3.0);

        let first = classifier
            .train_from_records(labelled(&["A", "A", "B"]))
            .await
            .unwrap();
        assert_eq!(
            classifier.classify(&record).await.unwrap().predicted_category,
            "A"
        );

        let second = classifier
            .train_from_records(labelled(&["B", "B", "A"]))
            .await
            .unwrap();
        assert_eq!(
            classifier.classify(&record).await.unwrap().predicted_category,
            "B"
        );

        assert_ne!(first.model_id, second.model_id);
        assert_eq!(classifier.summary().await.unwrap().model_id, second.model_id);
    }

    #[tokio::test]
    async fn test_failed_training_keeps_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = SupplierClassifier::new(MajorityEngine);

        let missing = classifier.train(dir.path().join("missing.csv")).await;
        assert!(matches!(missing, Err(ClassifierError::DataLoad { .. })));
        assert_eq!(classifier.state().await, TrainerState::Untrained);

        let trained = classifier
            .train_from_records(labelled(&["A", "B", "B"]))
            .await
            .unwrap();

        let empty = write_dataset(&dir, "empty.csv", "");
        assert!(matches!(
            classifier.train(&empty).await,
            Err(ClassifierError::DataLoad { .. })
        ));

        let malformed = write_dataset(&dir, "bad.csv", "a,b,c,d\n1,2,3\n");
        assert!(classifier.train(&malformed).await.is_err());

        assert_eq!(classifier.state().await, TrainerState::Trained);
        assert_eq!(classifier.summary().await.unwrap().model_id, trained.model_id);
    }

    #[tokio::test]
    async fn test_train_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(
            &dir,
            "train.csv",
            "DeliveryTime,Quality,Cost,Category\n1,2,3,A\n4,5,6,B\n7,8,9,B\n",
        );

        let classifier = SupplierClassifier::new(MajorityEngine);
        let summary = classifier.train(&path).await.unwrap();

        assert_eq!(summary.training_rows, 3);
        assert_eq!(
            classifier
                .classify(&SupplierRecord::new(0.0, 0.0, 0.0))
                .await
                .unwrap()
                .predicted_category,
            "B"
        );
    }

    #[tokio::test]
    async fn test_evaluate_before_training_fails() {
        let classifier = SupplierClassifier::new(MajorityEngine);

        // Untrained takes precedence over a bad path
        let err = classifier.evaluate("/does/not/exist.csv").await.unwrap_err();
        assert!(matches!(err, ClassifierError::ModelNotTrained));
    }

    #[tokio::test]
    async fn test_evaluate_reports_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = SupplierClassifier::new(MajorityEngine);
        classifier
            .train_from_records(labelled(&["A", "A", "B"]))
            .await
            .unwrap();

        let bad_path = classifier.evaluate(dir.path().join("missing.csv")).await;
        assert!(matches!(bad_path, Err(ClassifierError::DataLoad { .. })));

        let path = write_dataset(&dir, "test.csv", "a,b,c,d\n1,2,3,A\n1,2,3,A\n1,2,3,B\n");
        let report = classifier.evaluate(&path).await.unwrap();

        assert_eq!(
            report.confusion_matrix.counts().to_vec(),
            vec![vec![2, 0], vec![1, 0]]
        );
        assert!((report.micro_accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.macro_accuracy - 0.5).abs() < 1e-12);

        assert_eq!(report.per_class_metrics.len(), 2);
        assert_eq!(report.per_class_metrics[0].class_label, "Class 0");
        assert_eq!(report.per_class_metrics[0].precision, 0.667);
        assert_eq!(report.per_class_metrics[0].recall, 1.0);
        assert_eq!(report.per_class_metrics[0].f1, 0.8);
        assert_eq!(report.per_class_metrics[1].f1, 0.0);
    }

    #[tokio::test]
    async fn test_concurrent_training_serializes() {
        let classifier = Arc::new(SupplierClassifier::new(MajorityEngine));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let classifier = Arc::clone(&classifier);
                let winner = if i % 2 == 0 { "A" } else { "B" };
                tokio::spawn(async move {
                    classifier
                        .train_from_records(labelled(&[winner, winner, "C"]))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let summary = classifier.summary().await.unwrap();
        assert_eq!(summary.training_rows, 3);
        let prediction = classifier
            .classify(&SupplierRecord::new(1.0, 2.0, 3.0))
            .await
            .unwrap();
        assert!(["A", "B"].contains(&prediction.predicted_category.as_str()));
    }
}
