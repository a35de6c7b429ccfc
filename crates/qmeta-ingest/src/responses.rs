//! Response table loading.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Read a response export into a `DataFrame`.
///
/// Column types are inferred by polars; mixed columns stay strings and are
/// parsed numerically at scoring time.
pub fn load_responses(path: &Path) -> Result<DataFrame> {
    let polars_error = |source| IngestError::Polars {
        path: path.to_path_buf(),
        source,
    };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(polars_error)?
        .finish()
        .map_err(polars_error)?;
    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded responses");
    Ok(df)
}
