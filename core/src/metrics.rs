//! Classification metrics
//!
//! Holds the [`ConfusionMatrix`] produced by evaluation and derives per-class
//! precision, recall and F1 from it.
//!
//! Classes are labelled by row index (`"Class 0"`, `"Class 1"`, ...), not by
//! their category names.

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};

/// Square matrix of prediction counts
///
/// Element `[i][j]` is the number of records whose true class is `i` and
/// whose predicted class is `j`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u64>>", into = "Vec<Vec<u64>>")]
pub struct ConfusionMatrix {
    counts: Vec<Vec<u64>>,
}

impl TryFrom<Vec<Vec<u64>>> for ConfusionMatrix {
    type Error = ClassifierError;

    fn try_from(counts: Vec<Vec<u64>>) -> Result<Self> {
        Self::from_counts(counts)
    }
}

impl From<ConfusionMatrix> for Vec<Vec<u64>> {
    fn from(matrix: ConfusionMatrix) -> Self {
        matrix.counts
    }
}

impl ConfusionMatrix {
    /// Create an all-zero matrix for `n_classes` classes
    pub fn zeros(n_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; n_classes]; n_classes],
        }
    }

    /// Build a matrix from raw counts, rejecting non-square input
    pub fn from_counts(counts: Vec<Vec<u64>>) -> Result<Self> {
        validate_square(&counts)?;
        Ok(Self { counts })
    }

    /// Record one prediction
    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.counts[actual][predicted] += 1;
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn get(&self, actual: usize, predicted: usize) -> u64 {
        self.counts[actual][predicted]
    }

    pub fn true_positives(&self, class: usize) -> u64 {
        self.counts[class][class]
    }

    /// Predicted as `class` but actually something else (column sum off the diagonal)
    pub fn false_positives(&self, class: usize) -> u64 {
        (0..self.n_classes())
            .filter(|&i| i != class)
            .map(|i| self.counts[i][class])
            .sum()
    }

    /// Actually `class` but predicted as something else (row sum off the diagonal)
    pub fn false_negatives(&self, class: usize) -> u64 {
        (0..self.n_classes())
            .filter(|&j| j != class)
            .map(|j| self.counts[class][j])
            .sum()
    }

    /// Number of records whose true class is `class`
    pub fn support(&self, class: usize) -> u64 {
        self.counts[class].iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class_label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Derive per-class metrics, one entry per row in index order
///
/// Zero denominators yield 0 rather than NaN, so classes that were never
/// predicted or never seen still produce a well-formed entry. Values are
/// rounded to three decimals.
pub fn per_class_metrics(matrix: &ConfusionMatrix) -> Vec<ClassMetrics> {
    (0..matrix.n_classes())
        .map(|class| {
            let tp = matrix.true_positives(class);
            let fp = matrix.false_positives(class);
            let fn_ = matrix.false_negatives(class);

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                class_label: format!("Class {class}"),
                precision: round3(precision),
                recall: round3(recall),
                f1: round3(f1),
            }
        })
        .collect()
}

/// Same as [`per_class_metrics`] for a raw count table
///
/// Fails with [`ClassifierError::InvalidMatrix`] if the table is not square.
pub fn per_class_metrics_from_counts(counts: &[Vec<u64>]) -> Result<Vec<ClassMetrics>> {
    let matrix = ConfusionMatrix::from_counts(counts.to_vec())?;
    Ok(per_class_metrics(&matrix))
}

fn validate_square(counts: &[Vec<u64>]) -> Result<()> {
    let rows = counts.len();
    match counts.iter().position(|row| row.len() != rows) {
        Some(row) => Err(ClassifierError::InvalidMatrix {
            rows,
            row,
            len: counts[row].len(),
        }),
        None => Ok(()),
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
