//! Dataset loading
//!
//! Datasets are comma-separated files with a header row and four columns in
//! fixed order: `delivery_time`, `quality`, `cost`, `category`. Columns are
//! mapped by position, so header names are informational only.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{ClassifierError, Result};
use crate::record::SupplierRecord;

/// Number of columns every dataset row must carry
pub const DATASET_COLUMNS: usize = 4;

/// Read and parse a dataset file
pub async fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<SupplierRecord>> {
    let path = path.as_ref();
    let source_name = path.display().to_string();

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClassifierError::data_load(&source_name, e.to_string()))?;

    parse_records(&bytes, &source_name)
}

/// Parse dataset bytes into labelled records
///
/// `source_name` only appears in error messages.
pub fn parse_records(bytes: &[u8], source_name: &str) -> Result<Vec<SupplierRecord>> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ClassifierError::data_load(source_name, "file is empty"));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ClassifierError::data_load(source_name, format!("bad header row: {e}")))?;
    if headers.len() != DATASET_COLUMNS {
        return Err(ClassifierError::data_load(
            source_name,
            format!(
                "expected {} columns in header, found {}",
                DATASET_COLUMNS,
                headers.len()
            ),
        ));
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        let row = row.map_err(|e| {
            ClassifierError::data_load(source_name, format!("line {line}: {e}"))
        })?;
        records.push(parse_row(&row, line, source_name)?);
    }

    if records.is_empty() {
        return Err(ClassifierError::data_load(source_name, "no data rows"));
    }

    debug!("Parsed {} supplier records from {}", records.len(), source_name);
    Ok(records)
}

fn parse_row(row: &StringRecord, line: usize, source_name: &str) -> Result<SupplierRecord> {
    if row.len() != DATASET_COLUMNS {
        return Err(ClassifierError::data_load(
            source_name,
            format!(
                "line {line}: expected {} columns, found {}",
                DATASET_COLUMNS,
                row.len()
            ),
        ));
    }

    let number = |column: usize, name: &str| -> Result<f64> {
        let value = row[column].parse::<f64>().map_err(|_| {
            ClassifierError::data_load(
                source_name,
                format!("line {line}: {name} '{}' is not a number", &row[column]),
            )
        })?;
        if !value.is_finite() {
            return Err(ClassifierError::data_load(
                source_name,
                format!("line {line}: {name} '{}' is not a finite number", &row[column]),
            ));
        }
        Ok(value)
    };

    let delivery_time = number(0, "delivery_time")?;
    let quality = number(1, "quality")?;
    let cost = number(2, "cost")?;

    let category = &row[3];
    if category.is_empty() {
        return Err(ClassifierError::data_load(
            source_name,
            format!("line {line}: category is missing"),
        ));
    }

    Ok(SupplierRecord::new(delivery_time, quality, cost).with_category(category))
}
