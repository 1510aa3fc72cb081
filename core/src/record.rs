//! Supplier record types
//!
//! A [`SupplierRecord`] is both a training row (category present) and an
//! inference request (category absent or ignored).

use serde::{Deserialize, Serialize};

/// One supplier observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    /// Average delivery time
    pub delivery_time: f64,
    /// Quality score
    pub quality: f64,
    /// Unit cost
    pub cost: f64,
    /// Supplier category, required for training and evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SupplierRecord {
    /// Create an unlabelled record for inference
    pub fn new(delivery_time: f64, quality: f64, cost: f64) -> Self {
        Self {
            delivery_time,
            quality,
            cost,
            category: None,
        }
    }

    /// Attach a category label
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Numeric features in pipeline order
    pub fn features(&self) -> [f64; 3] {
        [self.delivery_time, self.quality, self.cost]
    }
}

/// Predicted category for a single record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_category: String,
}
