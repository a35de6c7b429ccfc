//! Resolution of rules against the question catalog.

use tracing::{debug, warn};

use qmeta_catalog::QuestionCatalog;
use qmeta_model::{ColumnSpec, QuestionInfo, QuestionType, ScoreRule, ScoringWarning};

/// Questions of `questionnaire` in catalog order.
///
/// Falls back to the original form name when the catalog stores the
/// questionnaire under its display name.
fn questionnaire_questions<'a>(
    catalog: &'a QuestionCatalog,
    questionnaire: &str,
) -> Vec<&'a QuestionInfo> {
    if catalog.has_questionnaire(questionnaire) {
        return catalog.by_questionnaire(questionnaire).collect();
    }
    catalog
        .questions()
        .iter()
        .filter(|question| question.alternate_questionnaire.as_deref() == Some(questionnaire))
        .collect()
}

/// Scorable catalog questions of `questionnaire`, in catalog order.
pub fn default_columns(catalog: &QuestionCatalog, questionnaire: &str) -> Vec<String> {
    questionnaire_questions(catalog, questionnaire)
        .into_iter()
        .filter(|question| question.is_default_scorable())
        .map(|question| question.variable_name.clone())
        .collect()
}

/// Replaces every `DEFAULT` column list with the questionnaire's scorable questions.
pub fn resolve_default_columns(
    rules: Vec<ScoreRule>,
    catalog: &QuestionCatalog,
) -> (Vec<ScoreRule>, Vec<ScoringWarning>) {
    let mut warnings = Vec::new();
    let resolved = rules
        .into_iter()
        .map(|rule| {
            if rule.columns != ColumnSpec::Default {
                return rule;
            }
            let columns = default_columns(catalog, &rule.questionnaire);
            if columns.is_empty() {
                let warning = ScoringWarning::EmptyDefaultColumns {
                    questionnaire: rule.questionnaire.clone(),
                };
                warn!("{warning}");
                warnings.push(warning);
            } else {
                debug!(questionnaire = %rule.questionnaire, columns = columns.len(), "DEFAULT columns resolved");
            }
            ScoreRule {
                columns: ColumnSpec::Listed(columns),
                ..rule
            }
        })
        .collect();
    (resolved, warnings)
}

/// Shared `(min, max)` choice keys when every scored item is an Ordinal
/// question with the same key range.
pub fn derive_score_range(rule: &ScoreRule, catalog: &QuestionCatalog) -> Option<(f64, f64)> {
    let columns = rule.columns.listed().filter(|columns| !columns.is_empty())?;
    let mut shared = None;
    for column in columns {
        let question = catalog.get(column)?;
        if question.question_type != QuestionType::Ordinal {
            return None;
        }
        let range = question.choice_set()?.key_range()?;
        match shared {
            None => shared = Some(range),
            Some(existing) if existing == range => {}
            Some(_) => return None,
        }
    }
    shared.map(|(min, max)| (min as f64, max as f64))
}

/// Fills in min/max from the catalog for rules that declare neither.
pub fn fill_score_ranges(rules: Vec<ScoreRule>, catalog: &QuestionCatalog) -> Vec<ScoreRule> {
    rules
        .into_iter()
        .map(|rule| {
            if rule.min_value.is_some() || rule.max_value.is_some() {
                return rule;
            }
            match derive_score_range(&rule, catalog) {
                Some((min, max)) => {
                    debug!(questionnaire = %rule.questionnaire, min, max, "score range taken from catalog");
                    rule.with_range(min, max)
                }
                None => rule,
            }
        })
        .collect()
}
