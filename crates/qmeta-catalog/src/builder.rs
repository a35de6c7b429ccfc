//! Catalog assembly.
//!
//! Joins classifier output with the mapping rows, expands checkbox fields
//! into indicator questions, then appends the synthetic entries.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info, info_span, warn};

use qmeta_model::{
    Bounds, CatalogOptions, ColumnMappingRow, DictionaryField, Provenance, QuestionInfo, QuestionType,
    QuestionnaireAliases, Validator,
};

use crate::catalog::QuestionCatalog;
use crate::classify::{Classification, classify};
use crate::error::Result;
use crate::questionnaire::{Discrepancy, find_discrepancies};
use crate::synthetic::{
    EVENT_VARIABLE, TIMESTAMP_SUFFIX, age_question, event_question,
    is_timestamp_name, timestamp_question,
};

/// Catalog plus the non-fatal findings gathered while building it.
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: QuestionCatalog,
    pub discrepancies: Vec<Discrepancy>,
    /// Mapping canonical names with no catalog entry and no placeholder.
    pub unmatched_mapping: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CatalogBuilder<'a> {
    options: CatalogOptions,
    aliases: Option<&'a QuestionnaireAliases>,
    exceptional_items: Option<&'a BTreeSet<String>>,
    mapping: &'a [ColumnMappingRow],
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(options: CatalogOptions) -> Self {
        Self {
            options,
            aliases: None,
            exceptional_items: None,
            mapping: &[],
        }
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: &'a QuestionnaireAliases) -> Self {
        self.aliases = Some(aliases);
        self
    }

    #[must_use]
    pub fn with_exceptional_items(mut self, items: &'a BTreeSet<String>) -> Self {
        self.exceptional_items = Some(items);
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, rows: &'a [ColumnMappingRow]) -> Self {
        self.mapping = rows;
        self
    }

    /// Classify every dictionary field and assemble the catalog.
    ///
    /// # Errors
    ///
    /// Fails when two entries share a variable name.
    pub fn build(&self, fields: &[DictionaryField]) -> Result<CatalogBuild> {
        let span = info_span!("catalog", fields = fields.len());
        let _guard = span.enter();

        let provenance = self.provenance_index();
        let mut questions = Vec::with_capacity(fields.len());
        for field in fields {
            let classification = classify(field);
            if classification.is_indicator_group {
                questions.extend(self.indicator_questions(field, &classification, &provenance));
            } else {
                questions.push(self.question(field, classification, &provenance));
            }
        }
        debug!(questions = questions.len(), "dictionary classified");

        let unmatched_mapping = self.append_synthetic(&mut questions);
        let catalog = QuestionCatalog::from_questions(questions)?;
        let discrepancies =
            find_discrepancies(&catalog, self.mapping, self.options.rename_questionnaires);
        for discrepancy in &discrepancies {
            warn!(questionnaire = %discrepancy.questionnaire, "{discrepancy}");
        }
        info!(
            questions = catalog.len(),
            questionnaires = catalog.questionnaires().count(),
            discrepancies = discrepancies.len(),
            "catalog built"
        );
        Ok(CatalogBuild {
            catalog,
            discrepancies,
            unmatched_mapping,
        })
    }

    fn questionnaire_name(&self, form_name: &str) -> String {
        match self.aliases {
            Some(aliases) if self.options.rename_questionnaires => {
                aliases.canonical_name(form_name).to_string()
            }
            _ => form_name.to_string(),
        }
    }

    fn mapping_questionnaire<'r>(&self, row: &'r ColumnMappingRow) -> &'r str {
        if self.options.rename_questionnaires {
            &row.display_questionnaire
        } else {
            &row.questionnaire
        }
    }

    fn is_exceptional(&self, name: &str) -> bool {
        self.exceptional_items
            .is_some_and(|items| items.contains(name))
    }

    fn provenance_index(&self) -> HashMap<&'a str, Provenance> {
        let mut index = HashMap::new();
        for row in self.mapping {
            index
                .entry(row.canonical_name.as_str())
                .or_insert(row.provenance);
        }
        index
    }

    fn base_question(
        &self,
        field: &DictionaryField,
        name: &str,
        text: String,
        question_type: QuestionType,
    ) -> QuestionInfo {
        QuestionInfo::new(name, text, question_type, self.questionnaire_name(&field.form_name))
        .with_alternate_questionnaire(Some(field.form_name.clone()))
        .with_timestamp(is_timestamp_name(&field.name))
        .with_branching_logic(field.branching_logic.clone())
    }

    fn question(
        &self,
        field: &DictionaryField,
        classification: Classification,
        provenance: &HashMap<&str, Provenance>,
    ) -> QuestionInfo {
        let Classification {
            question_type,
            choices,
            value_range,
            validator,
            ..
        } = classification;
        self.base_question(field, &field.name, field.label.clone(), question_type)
            .with_excluded_from_scoring(self.is_exceptional(&field.name))
            .with_choices(choices)
            .with_value_range(value_range)
            .with_validator(self.options.include_validator.then_some(validator))
            .with_provenance(provenance.get(field.name.as_str()).copied())
    }

    /// One Binary question per declared choice, named `{parent}___{key}`.
    fn indicator_questions(
        &self,
        field: &DictionaryField,
        classification: &Classification,
        provenance: &HashMap<&str, Provenance>,
    ) -> Vec<QuestionInfo> {
        let Some(choices) = classification.choice_set() else {
            return Vec::new();
        };
        choices
            .iter()
            .map(|(key, label)| {
                let name = format!("{}___{key}", field.name);
                let source = provenance
                    .get(name.as_str())
                    .or_else(|| provenance.get(field.name.as_str()))
                    .copied();
                let text = format!("{} - {label}", field.label);
                self.base_question(field, &name, text, QuestionType::Binary)
                    .with_excluded_from_scoring(
                        self.is_exceptional(&name) || self.is_exceptional(&field.name),
                    )
                    .with_ancestor(Some(field.name.clone()))
                    .with_validator(self.options.include_validator.then_some(Validator::Binary))
                    .with_provenance(source)
            })
            .collect()
    }

    /// Appends the fixed items and timestamp placeholders, returning the
    /// mapping names that are still missing.
    fn append_synthetic(&self, questions: &mut Vec<QuestionInfo>) -> Vec<String> {
        let mut known: HashSet<String> = questions
            .iter()
            .map(|q| q.variable_name.to_lowercase())
            .collect();
        for fixed in [age_question(), event_question()] {
            if known.insert(fixed.variable_name.to_lowercase()) {
                questions.push(self.with_default_validator(fixed));
            } else {
                debug!(name = %fixed.variable_name, "fixed item already in dictionary");
            }
        }

        let mut missing = Vec::new();
        for row in self.mapping {
            let name = &row.canonical_name;
            if known.contains(&name.to_lowercase()) {
                continue;
            }
            if name.ends_with(TIMESTAMP_SUFFIX) {
                let questionnaire = self.mapping_questionnaire(row);
                let placeholder =
                    timestamp_question(name, questionnaire).with_provenance(Some(row.provenance));
                questions.push(self.with_default_validator(placeholder));
                known.insert(name.to_lowercase());
            } else if name != EVENT_VARIABLE {
                debug!(name = %name, questionnaire = %row.questionnaire, "mapping name missing from catalog");
                missing.push(name.clone());
                known.insert(name.to_lowercase());
            }
        }
        if !missing.is_empty() {
            warn!(count = missing.len(), "mapping names without catalog entries");
        }
        missing
    }

    /// Entries without dictionary metadata get the unbounded validator of their type.
    fn with_default_validator(&self, question: QuestionInfo) -> QuestionInfo {
        let validator = question.question_type.validator(None, Bounds::default());
        question.with_validator(self.options.include_validator.then_some(validator))
    }
}
