//! Classifier errors

use std::io;

/// Errors raised by the supplier classifier
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Failed to load dataset '{source_name}': {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("Model has not been trained yet")]
    ModelNotTrained,

    #[error("Confusion matrix must be square: {rows} rows but row {row} has {len} columns")]
    InvalidMatrix { rows: usize, row: usize, len: usize },

    #[error("Model engine failed: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ClassifierError {
    pub fn data_load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
