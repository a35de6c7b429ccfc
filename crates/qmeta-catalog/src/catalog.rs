//! Canonical question catalog.

use std::collections::BTreeMap;

use qmeta_model::{CaseInsensitiveIndex, QuestionInfo, QuestionType};

use crate::error::{CatalogError, Result};

/// Immutable registry of typed questions keyed by canonical name.
///
/// Lookups by name are case-insensitive; iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    questions: Vec<QuestionInfo>,
    index: CaseInsensitiveIndex,
    by_questionnaire: BTreeMap<String, Vec<usize>>,
}

impl QuestionCatalog {
    /// Build a catalog from questions in order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateVariable`] when two questions share a
    /// name (compared case-insensitively).
    pub fn from_questions(questions: Vec<QuestionInfo>) -> Result<Self> {
        let mut index = CaseInsensitiveIndex::new();
        let mut by_questionnaire: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, question) in questions.iter().enumerate() {
            if let Some(existing) = index.insert(&question.variable_name, position) {
                return Err(CatalogError::DuplicateVariable {
                    name: question.variable_name.clone(),
                    first_questionnaire: questions[existing].questionnaire.clone(),
                    second_questionnaire: question.questionnaire.clone(),
                });
            }
            by_questionnaire
                .entry(question.questionnaire.clone())
                .or_default()
                .push(position);
        }
        Ok(Self {
            questions,
            index,
            by_questionnaire,
        })
    }

    pub fn get(&self, name: &str) -> Option<&QuestionInfo> {
        self.index.get(name).map(|position| &self.questions[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    pub fn questions(&self) -> &[QuestionInfo] {
        &self.questions
    }

    /// Questions owned by `questionnaire`, ignoring case, in catalog order.
    pub fn by_questionnaire<'a>(
        &'a self,
        questionnaire: &str,
    ) -> impl Iterator<Item = &'a QuestionInfo> + use<'a> {
        let mut positions: Vec<usize> = self
            .by_questionnaire
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(questionnaire))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        positions.sort_unstable();
        positions
            .into_iter()
            .map(|position| &self.questions[position])
    }

    /// Questions filed under exactly `questionnaire`.
    pub(crate) fn questionnaire_group<'a>(
        &'a self,
        questionnaire: &str,
    ) -> impl Iterator<Item = &'a QuestionInfo> + use<'a> {
        self.by_questionnaire
            .get(questionnaire)
            .into_iter()
            .flatten()
            .map(|position| &self.questions[*position])
    }

    pub fn questionnaires(&self) -> impl Iterator<Item = &str> {
        self.by_questionnaire.keys().map(String::as_str)
    }

    pub fn has_questionnaire(&self, questionnaire: &str) -> bool {
        self.by_questionnaire
            .keys()
            .any(|name| name.eq_ignore_ascii_case(questionnaire))
    }

    pub fn timestamp_questions<'a>(
        &'a self,
        questionnaire: &str,
    ) -> impl Iterator<Item = &'a QuestionInfo> + use<'a> {
        self.by_questionnaire(questionnaire)
            .filter(|question| question.is_timestamp)
    }

    /// Questions whose text contains `term`, ignoring case.
    pub fn search_by_label(&self, term: &str) -> Vec<&QuestionInfo> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.questions
            .iter()
            .filter(|question| question.text.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.variable_name.as_str())
    }

    pub fn type_counts(&self) -> BTreeMap<QuestionType, usize> {
        let mut counts = BTreeMap::new();
        for question in &self.questions {
            *counts.entry(question.question_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(name: &str, questionnaire: &str) -> QuestionInfo {
        QuestionInfo::new(name, format!("Text of {name}"), QuestionType::Ordinal, questionnaire)
    }

    #[test]
    fn duplicates_are_fatal() {
        let result = QuestionCatalog::from_questions(vec![
            question("sdq_1", "sdq"),
            question("SDQ_1", "sdq_parents"),
        ]);
        let Err(CatalogError::DuplicateVariable {
            first_questionnaire,
            second_questionnaire,
            ..
        }) = result
        else {
            panic!("expected duplicate error");
        };
        assert_eq!(first_questionnaire, "sdq");
        assert_eq!(second_questionnaire, "sdq_parents");
    }

    #[test]
    fn lookups_by_name_and_questionnaire() {
        let catalog = QuestionCatalog::from_questions(vec![
            question("sdq_1", "sdq"),
            question("mfq_1", "mfq"),
            question("sdq_2", "sdq").with_timestamp(true),
        ])
        .unwrap();
        assert_eq!(catalog.get("SDQ_2").map(|q| q.questionnaire.as_str()), Some("sdq"));
        let sdq: Vec<_> = catalog.by_questionnaire("sdq").map(|q| q.variable_name.as_str()).collect();
        assert_eq!(sdq, ["sdq_1", "sdq_2"]);
        assert_eq!(catalog.timestamp_questions("sdq").count(), 1);
        assert_eq!(catalog.by_questionnaire("missing").count(), 0);
        assert_eq!(catalog.search_by_label("OF MFQ").len(), 1);
        assert_eq!(catalog.type_counts().get(&QuestionType::Ordinal), Some(&3));
    }

    #[test]
    fn questionnaire_lookup_ignores_case() {
        let catalog = QuestionCatalog::from_questions(vec![
            question("cts_c_1", "CTS_C"),
            question("mfq_1", "mfq"),
            question("cts_c_2", "cts_c"),
        ])
        .unwrap();
        let cts: Vec<_> = catalog.by_questionnaire("Cts_C").map(|q| q.variable_name.as_str()).collect();
        assert_eq!(cts, ["cts_c_1", "cts_c_2"]);
        assert!(catalog.has_questionnaire("MFQ"));
        assert_eq!(catalog.questionnaire_group("cts_c").count(), 1);
    }
}
