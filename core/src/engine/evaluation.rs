//! Multiclass evaluation
//!
//! Aggregates follow the usual multiclass definitions:
//! - micro accuracy: fraction of records predicted correctly
//! - macro accuracy: mean per-class recall over classes present in the data
//! - log loss: mean negative log probability of the true class
//! - log-loss reduction: improvement over always predicting the class priors

use crate::engine::{MulticlassEvaluation, ScoredRecord};
use crate::error::{ClassifierError, Result};
use crate::metrics::ConfusionMatrix;

/// Floor applied to probabilities before taking the log
const PROBABILITY_EPSILON: f64 = 1e-15;

/// Evaluate scored records
pub fn evaluate_scored(predictions: &[ScoredRecord]) -> Result<MulticlassEvaluation> {
    let n_classes = match predictions.first() {
        Some(first) => first.probabilities.len(),
        None => {
            return Err(ClassifierError::data_load(
                "evaluation set",
                "no labelled rows to evaluate",
            ))
        }
    };

    let mut matrix = ConfusionMatrix::zeros(n_classes);
    let mut log_loss_sum = 0.0;

    for (index, scored) in predictions.iter().enumerate() {
        if scored.probabilities.len() != n_classes
            || scored.actual >= n_classes
            || scored.predicted >= n_classes
        {
            return Err(ClassifierError::Engine(format!(
                "scored record {index} is inconsistent with {n_classes} classes"
            )));
        }

        matrix.record(scored.actual, scored.predicted);
        log_loss_sum -= scored.probabilities[scored.actual]
            .max(PROBABILITY_EPSILON)
            .ln();
    }

    let total = predictions.len() as f64;
    let correct: u64 = (0..n_classes).map(|c| matrix.true_positives(c)).sum();
    let micro_accuracy = correct as f64 / total;

    let class_recalls: Vec<f64> = (0..n_classes)
        .filter(|&c| matrix.support(c) > 0)
        .map(|c| matrix.true_positives(c) as f64 / matrix.support(c) as f64)
        .collect();
    let macro_accuracy = class_recalls.iter().sum::<f64>() / class_recalls.len() as f64;

    let log_loss = log_loss_sum / total;

    let prior_log_loss: f64 = (0..n_classes)
        .map(|c| matrix.support(c) as f64 / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    let log_loss_reduction = if prior_log_loss > 0.0 {
        (prior_log_loss - log_loss) / prior_log_loss
    } else {
        0.0
    };

    Ok(MulticlassEvaluation {
        macro_accuracy,
        micro_accuracy,
        log_loss,
        log_loss_reduction,
        confusion_matrix: matrix,
    })
}
