//! Per-questionnaire views over the catalog.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use qmeta_model::{ColumnMappingRow, ParticipantRole, ParticipantRoles, Provenance};

use crate::catalog::QuestionCatalog;
use crate::synthetic::is_timestamp_name;

/// Names a questionnaire carries on one side but not the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub questionnaire: String,
    pub only_in_mapping: Vec<String>,
    pub only_in_catalog: Vec<String>,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} name(s) only in mapping, {} only in catalog",
            self.questionnaire,
            self.only_in_mapping.len(),
            self.only_in_catalog.len()
        )?;
        if !self.only_in_mapping.is_empty() {
            write!(f, " [mapping: {}]", self.only_in_mapping.join(", "))?;
        }
        if !self.only_in_catalog.is_empty() {
            write!(f, " [catalog: {}]", self.only_in_catalog.join(", "))?;
        }
        Ok(())
    }
}

/// Compare mapping names against catalog names questionnaire by questionnaire.
///
/// Timestamps, excluded items and companion-only rows are left out of the
/// comparison, as are questionnaires the catalog does not know.
pub fn find_discrepancies(
    catalog: &QuestionCatalog,
    mapping: &[ColumnMappingRow],
    use_display_names: bool,
) -> Vec<Discrepancy> {
    let comparable = |name: &str| {
        !is_timestamp_name(name)
            && catalog
                .get(name)
                .is_none_or(|question| !question.excluded_from_scoring)
    };

    let mut mapped: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for row in mapping {
        if row.provenance == Provenance::Companion || !comparable(&row.canonical_name) {
            continue;
        }
        let questionnaire = if use_display_names {
            row.display_questionnaire.as_str()
        } else {
            row.questionnaire.as_str()
        };
        mapped
            .entry(questionnaire)
            .or_default()
            .insert(row.canonical_name.to_lowercase());
    }

    let mut discrepancies = Vec::new();
    for (questionnaire, mapping_names) in mapped {
        if !catalog.has_questionnaire(questionnaire) {
            continue;
        }
        let catalog_names: BTreeSet<String> = catalog
            .by_questionnaire(questionnaire)
            .filter(|question| !question.is_timestamp && comparable(&question.variable_name))
            .map(|question| question.variable_name.to_lowercase())
            .collect();
        let only_in_mapping: Vec<String> =
            mapping_names.difference(&catalog_names).cloned().collect();
        let only_in_catalog: Vec<String> =
            catalog_names.difference(&mapping_names).cloned().collect();
        if only_in_mapping.is_empty() && only_in_catalog.is_empty() {
            continue;
        }
        discrepancies.push(Discrepancy {
            questionnaire: questionnaire.to_string(),
            only_in_mapping,
            only_in_catalog,
        });
    }
    discrepancies
}

/// Counts describing one questionnaire of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionnaireSummary {
    pub questionnaire: String,
    /// Form name when it differs from the catalog questionnaire name.
    pub alternate_name: Option<String>,
    pub items: usize,
    pub scorable_items: usize,
    pub excluded_items: usize,
    pub timestamp_items: usize,
    /// Items per provenance; entries absent from the mapping count nowhere.
    pub forms_items: usize,
    pub companion_items: usize,
    pub both_items: usize,
    pub participant_role: Option<ParticipantRole>,
    pub has_scoring: bool,
}

/// One summary per catalog questionnaire, sorted by name.
///
/// Roles and score rules may be keyed by either the catalog name or the
/// original form name.
pub fn summarize_questionnaires(
    catalog: &QuestionCatalog,
    roles: &ParticipantRoles,
    scored: &BTreeSet<String>,
) -> Vec<QuestionnaireSummary> {
    catalog
        .questionnaires()
        .map(|questionnaire| {
            let mut summary = QuestionnaireSummary {
                questionnaire: questionnaire.to_string(),
                alternate_name: None,
                items: 0,
                scorable_items: 0,
                excluded_items: 0,
                timestamp_items: 0,
                forms_items: 0,
                companion_items: 0,
                both_items: 0,
                participant_role: None,
                has_scoring: false,
            };
            for question in catalog.questionnaire_group(questionnaire) {
                summary.items += 1;
                summary.scorable_items += usize::from(question.is_default_scorable());
                summary.excluded_items += usize::from(question.excluded_from_scoring);
                summary.timestamp_items += usize::from(question.is_timestamp);
                match question.provenance {
                    Some(Provenance::Forms) => summary.forms_items += 1,
                    Some(Provenance::Companion) => summary.companion_items += 1,
                    Some(Provenance::Both) => summary.both_items += 1,
                    None => {}
                }
                if summary.alternate_name.is_none()
                    && let Some(form) = &question.alternate_questionnaire
                    && form != questionnaire
                {
                    summary.alternate_name = Some(form.clone());
                }
            }
            let names = std::iter::once(questionnaire).chain(summary.alternate_name.as_deref());
            for name in names {
                if summary.participant_role.is_none() {
                    summary.participant_role = roles.role_of(name).cloned();
                }
                summary.has_scoring |= scored.contains(name);
            }
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmeta_model::{QuestionInfo, QuestionType, SystemNames};

    fn mapping_row(questionnaire: &str, name: &str) -> ColumnMappingRow {
        ColumnMappingRow::new(
            questionnaire,
            questionnaire,
            name,
            SystemNames {
                source_a: Some(name.to_string()),
                ..SystemNames::default()
            },
        )
        .unwrap()
    }

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::from_questions(vec![
            QuestionInfo::new("mfq_1", "a", QuestionType::Ordinal, "mfq"),
            QuestionInfo::new("mfq_2", "b", QuestionType::Ordinal, "mfq"),
            QuestionInfo::new("mfq_note", "c", QuestionType::Textual, "mfq")
                .with_excluded_from_scoring(true),
            QuestionInfo::new("mfq_timestamp", "timestamp", QuestionType::Date, "mfq")
                .with_timestamp(true),
            QuestionInfo::new("sdq_1", "d", QuestionType::Ordinal, "sdq_p")
                .with_alternate_questionnaire(Some("sdq_parents".to_string())),
        ])
        .unwrap()
    }

    #[test]
    fn discrepancies_skip_timestamps_and_exclusions() {
        let mapping = [
            mapping_row("mfq", "mfq_1"),
            mapping_row("mfq", "mfq_3"),
            mapping_row("mfq", "mfq_timestamp"),
            mapping_row("mfq", "mfq_note"),
            mapping_row("unknown", "x_1"),
        ];
        let found = find_discrepancies(&catalog(), &mapping, true);
        assert_eq!(
            found,
            [Discrepancy {
                questionnaire: "mfq".to_string(),
                only_in_mapping: vec!["mfq_3".to_string()],
                only_in_catalog: vec!["mfq_2".to_string()],
            }]
        );
        insta::assert_snapshot!(
            found[0].to_string(),
            @"mfq: 1 name(s) only in mapping, 1 only in catalog [mapping: mfq_3] [catalog: mfq_2]"
        );
    }

    #[test]
    fn summaries_count_items_and_look_up_roles() {
        let roles = ParticipantRoles::new([("sdq_parents".to_string(), ParticipantRole::Mother)]);
        let scored = BTreeSet::from(["mfq".to_string()]);
        let summaries = summarize_questionnaires(&catalog(), &roles, &scored);
        assert_eq!(summaries.len(), 2);

        let mfq = &summaries[0];
        assert_eq!(mfq.items, 4);
        assert_eq!(mfq.scorable_items, 2);
        assert_eq!(mfq.excluded_items, 1);
        assert_eq!(mfq.timestamp_items, 1);
        assert!(mfq.has_scoring);

        let sdq = &summaries[1];
        assert_eq!(sdq.alternate_name.as_deref(), Some("sdq_parents"));
        assert_eq!(sdq.participant_role, Some(ParticipantRole::Mother));
        assert!(!sdq.has_scoring);
    }

    #[test]
    fn summaries_split_items_by_provenance() {
        let catalog = QuestionCatalog::from_questions(vec![
            QuestionInfo::new("ari_s_1", "a", QuestionType::Ordinal, "ari_s")
                .with_provenance(Some(Provenance::Forms)),
            QuestionInfo::new("ari_s_2", "b", QuestionType::Ordinal, "ari_s")
                .with_provenance(Some(Provenance::Both)),
            QuestionInfo::new("ari_s_3", "c", QuestionType::Ordinal, "ari_s")
                .with_provenance(Some(Provenance::Both)),
            QuestionInfo::new("ari_s_7", "d", QuestionType::Ordinal, "ari_s")
                .with_provenance(Some(Provenance::Companion)),
            QuestionInfo::new("ari_s_timestamp", "timestamp", QuestionType::Date, "ari_s")
                .with_timestamp(true),
        ])
        .unwrap();
        let summaries =
            summarize_questionnaires(&catalog, &ParticipantRoles::default(), &BTreeSet::new());
        let ari = &summaries[0];
        assert_eq!(ari.items, 5);
        assert_eq!(
            (ari.forms_items, ari.companion_items, ari.both_items),
            (1, 1, 2)
        );
    }
}
