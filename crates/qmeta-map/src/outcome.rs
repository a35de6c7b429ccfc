//! Reconciliation results.

use std::collections::BTreeMap;

use qmeta_model::{ColumnMappingRow, MappingWarning, Provenance};

/// Rows and warnings produced by one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct MappingOutcome {
    rows: Vec<ColumnMappingRow>,
    warnings: Vec<MappingWarning>,
}

/// Per-questionnaire row counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionnaireMapping {
    pub questionnaire: String,
    pub display_questionnaire: String,
    pub rows: usize,
    pub forms: usize,
    pub companion: usize,
    pub both: usize,
    pub imputed: usize,
}

impl MappingOutcome {
    pub fn new(rows: Vec<ColumnMappingRow>, warnings: Vec<MappingWarning>) -> Self {
        Self { rows, warnings }
    }

    pub fn rows(&self) -> &[ColumnMappingRow] {
        &self.rows
    }

    pub fn warnings(&self) -> &[MappingWarning] {
        &self.warnings
    }

    pub fn rows_for<'a>(&'a self, questionnaire: &'a str) -> impl Iterator<Item = &'a ColumnMappingRow> {
        self.rows
            .iter()
            .filter(move |row| row.questionnaire == questionnaire)
    }

    /// First row whose canonical name is `name`.
    pub fn find(&self, name: &str) -> Option<&ColumnMappingRow> {
        self.rows.iter().find(|row| row.canonical_name == name)
    }

    /// Row counts per questionnaire, in first-seen order.
    pub fn summaries(&self) -> Vec<QuestionnaireMapping> {
        let mut order: Vec<String> = Vec::new();
        let mut by_name: BTreeMap<String, QuestionnaireMapping> = BTreeMap::new();
        for row in &self.rows {
            let summary = by_name.entry(row.questionnaire.clone()).or_insert_with(|| {
                order.push(row.questionnaire.clone());
                QuestionnaireMapping {
                    questionnaire: row.questionnaire.clone(),
                    display_questionnaire: row.display_questionnaire.clone(),
                    ..QuestionnaireMapping::default()
                }
            });
            summary.rows += 1;
            match row.provenance {
                Provenance::Forms => summary.forms += 1,
                Provenance::Companion => summary.companion += 1,
                Provenance::Both => summary.both += 1,
            }
            if row.imputation_source.is_some() {
                summary.imputed += 1;
            }
        }
        order
            .into_iter()
            .filter_map(|name| by_name.remove(&name))
            .collect()
    }
}
