//! Field dictionary loader.

use std::path::Path;

use tracing::{debug, warn};

use qmeta_model::{DictionaryField, FieldKind};

use crate::csv_utils::{get_field, get_optional, read_csv_rows};
use crate::error::Result;

pub const NAME_COLUMN: &str = "Variable / Field Name";
pub const FORM_COLUMN: &str = "Form Name";
pub const TYPE_COLUMN: &str = "Field Type";
pub const LABEL_COLUMN: &str = "Field Label";
pub const CHOICES_COLUMN: &str = "Choices, Calculations, OR Slider Labels";
pub const VALIDATION_COLUMN: &str = "Text Validation Type OR Show Slider Number";
pub const VALIDATION_MIN_COLUMN: &str = "Text Validation Min";
pub const VALIDATION_MAX_COLUMN: &str = "Text Validation Max";
pub const BRANCHING_COLUMN: &str = "Branching Logic (Show field only if...)";

/// Load dictionary rows in file order. Rows without a variable name are skipped.
pub fn load_dictionary(path: &Path) -> Result<Vec<DictionaryField>> {
    let rows = read_csv_rows(path, &[NAME_COLUMN, FORM_COLUMN, TYPE_COLUMN, LABEL_COLUMN])?;
    let mut fields = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let Some(name) = get_optional(row, NAME_COLUMN) else {
            warn!(path = %path.display(), row = idx + 2, "dictionary row without a variable name");
            continue;
        };
        fields.push(DictionaryField {
            name,
            form_name: get_field(row, FORM_COLUMN),
            kind: FieldKind::from(get_field(row, TYPE_COLUMN).as_str()),
            label: get_field(row, LABEL_COLUMN),
            choices: get_optional(row, CHOICES_COLUMN),
            validation: get_optional(row, VALIDATION_COLUMN),
            validation_min: get_optional(row, VALIDATION_MIN_COLUMN),
            validation_max: get_optional(row, VALIDATION_MAX_COLUMN),
            branching_logic: get_optional(row, BRANCHING_COLUMN),
        });
    }
    debug!(path = %path.display(), fields = fields.len(), "loaded field dictionary");
    Ok(fields)
}
