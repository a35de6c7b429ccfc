//! Header-keyed CSV rows shared by the table loaders.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

pub type CsvRow = BTreeMap<String, String>;

/// Read a CSV file into header-keyed rows.
///
/// BOM characters are stripped from headers and every value is trimmed.
/// Every name in `required` must appear in the header row.
pub fn read_csv_rows(path: &Path, required: &[&str]) -> Result<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::csv(path, &error))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| IngestError::csv(path, &error))?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();

    for column in required {
        if !headers.iter().any(|header| header == column) {
            return Err(IngestError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::csv(path, &error))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row = CsvRow::new();
        for (idx, value) in record.iter().enumerate() {
            if let Some(key) = headers.get(idx) {
                row.insert(key.clone(), value.trim().to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Get a field value from a row, returning empty string if not present.
pub fn get_field(row: &CsvRow, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

/// Get an optional field value from a row (None if empty or missing).
pub fn get_optional(row: &CsvRow, key: &str) -> Option<String> {
    row.get(key).filter(|v| !v.is_empty()).cloned()
}
