//! CSV export of mapping rows.

use std::io::Write;
use std::path::Path;

use qmeta_model::ColumnMappingRow;

use crate::error::{MapError, Result};

const HEADER: [&str; 10] = [
    "questionnaire",
    "display_questionnaire",
    "canonical_name",
    "source_a_name",
    "source_b_name",
    "companion_name",
    "companion_match_type",
    "original_companion_name",
    "imputation_source",
    "provenance",
];

/// Write rows as CSV to any writer.
pub fn write_mapping<W: Write>(writer: W, rows: &[ColumnMappingRow]) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.write_record([
            row.questionnaire.as_str(),
            row.display_questionnaire.as_str(),
            row.canonical_name.as_str(),
            row.source_a_name.as_deref().unwrap_or_default(),
            row.source_b_name.as_deref().unwrap_or_default(),
            row.companion_name.as_deref().unwrap_or_default(),
            row.companion_match_type.as_deref().unwrap_or_default(),
            row.original_companion_name.as_deref().unwrap_or_default(),
            row.imputation_source.as_deref().unwrap_or_default(),
            row.provenance.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows to a CSV file.
pub fn write_mapping_csv(path: &Path, rows: &[ColumnMappingRow]) -> Result<()> {
    let export_error = |message: String| MapError::Export {
        path: path.to_path_buf(),
        message,
    };
    let file = std::fs::File::create(path).map_err(|error| export_error(error.to_string()))?;
    write_mapping(file, rows).map_err(|error| export_error(error.to_string()))
}
