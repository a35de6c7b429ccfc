//! Loaders for the registry and lookup tables.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use qmeta_model::{
    CompanionEntry, CompanionTable, ExclusionList, ImputationTable, ParticipantRole,
    ParticipantRoles, QuestionnaireAliases, RuleTable, SourceRegistry,
};

use crate::csv_utils::{get_field, get_optional, read_csv_rows};
use crate::error::{IngestError, Result};

/// Load a forms-system column registry (`questionnaire_name`, `column_names`).
pub fn load_source_registry(path: &Path) -> Result<SourceRegistry> {
    let rows = read_csv_rows(path, &["questionnaire_name", "column_names"])?;
    let mut registry = SourceRegistry::new();
    for row in &rows {
        let questionnaire = get_field(row, "questionnaire_name");
        if questionnaire.is_empty() {
            continue;
        }
        registry.insert_joined(&questionnaire, &get_field(row, "column_names"));
    }
    debug!(path = %path.display(), questionnaires = registry.len(), "loaded source registry");
    Ok(registry)
}

/// Load the companion-system rename table.
pub fn load_companion_table(path: &Path) -> Result<CompanionTable> {
    let rows = read_csv_rows(path, &["questionnaire", "canonical_name", "companion_name"])?;
    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        let Some(companion_name) = get_optional(row, "companion_name") else {
            continue;
        };
        entries.push(CompanionEntry {
            questionnaire: get_field(row, "questionnaire"),
            canonical_name: get_optional(row, "canonical_name"),
            companion_name,
            match_type: get_optional(row, "match_type"),
            original_companion_name: get_optional(row, "original_companion_name"),
        });
    }
    let table = CompanionTable::new(entries);
    debug!(path = %path.display(), entries = table.len(), "loaded companion table");
    Ok(table)
}

/// Load the imputation rename table (`new_name`, `original`).
pub fn load_imputation_table(path: &Path) -> Result<ImputationTable> {
    let rows = read_csv_rows(path, &["new_name", "original"])?;
    Ok(ImputationTable::new(rows.iter().filter_map(|row| {
        Some((get_optional(row, "new_name")?, get_optional(row, "original")?))
    })))
}

/// Load the invalid-column exclusion list (`column_name`).
pub fn load_exclusions(path: &Path) -> Result<ExclusionList> {
    let rows = read_csv_rows(path, &["column_name"])?;
    Ok(ExclusionList::new(
        rows.iter().filter_map(|row| get_optional(row, "column_name")),
    ))
}

/// Load the questionnaire alias table (`alias`, `questionnaire`).
pub fn load_aliases(path: &Path) -> Result<QuestionnaireAliases> {
    let rows = read_csv_rows(path, &["alias", "questionnaire"])?;
    Ok(QuestionnaireAliases::new(rows.iter().filter_map(|row| {
        Some((get_optional(row, "alias")?, get_optional(row, "questionnaire")?))
    })))
}

/// Load the reconciliation rule table (`questionnaire`, `rule`).
///
/// Unknown rules fail the whole load.
pub fn load_rule_table(path: &Path) -> Result<RuleTable> {
    let rows = read_csv_rows(path, &["questionnaire", "rule"])?;
    let pairs = rows
        .iter()
        .filter_map(|row| Some((get_optional(row, "questionnaire")?, get_field(row, "rule"))));
    RuleTable::from_raw(pairs).map_err(|error| IngestError::model(path, error))
}

/// Load the excluded-from-scoring item names (`question_name`).
pub fn load_exceptional_items(path: &Path) -> Result<BTreeSet<String>> {
    let rows = read_csv_rows(path, &["question_name"])?;
    Ok(rows
        .iter()
        .filter_map(|row| get_optional(row, "question_name"))
        .collect())
}

/// Load the participant-role table (`questionnaire`, `participant_type`).
pub fn load_participant_roles(path: &Path) -> Result<ParticipantRoles> {
    let rows = read_csv_rows(path, &["questionnaire", "participant_type"])?;
    Ok(ParticipantRoles::new(rows.iter().filter_map(|row| {
        let questionnaire = get_optional(row, "questionnaire")?;
        let role = get_optional(row, "participant_type")?;
        Some((questionnaire, ParticipantRole::from(role.as_str())))
    })))
}
