//! Participant-variant expansion.
//!
//! Questionnaires answered by a duplicable participant role (by default the
//! mother) get a second rule for the symmetric role. The questionnaire name,
//! every listed column, the reversed columns and each cluster are renamed by
//! rewriting the trailing name segment.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use qmeta_common::replace_trailing_segment;
use qmeta_model::{
    Cluster, ColumnSpec, ParticipantRoles, ScoreRule, ScoringWarning, VariantRenameRules,
};

/// Renames `name` with the first rule matching its trailing segment.
///
/// Names without a matching segment come back unchanged.
pub fn rename_variant(name: &str, renames: &VariantRenameRules) -> String {
    renames
        .rules
        .iter()
        .find_map(|rule| replace_trailing_segment(name, &rule.from, &rule.to))
        .unwrap_or_else(|| name.to_string())
}

fn rename_all(names: &[String], renames: &VariantRenameRules) -> Vec<String> {
    names
        .iter()
        .map(|name| rename_variant(name, renames))
        .collect()
}

/// The renamed copy of `rule`, or `None` when its name has no renamable segment.
pub fn variant_of(rule: &ScoreRule, renames: &VariantRenameRules) -> Option<ScoreRule> {
    let questionnaire = rename_variant(&rule.questionnaire, renames);
    if questionnaire == rule.questionnaire {
        return None;
    }
    let columns = match &rule.columns {
        ColumnSpec::Default => ColumnSpec::Default,
        ColumnSpec::Listed(columns) => ColumnSpec::Listed(rename_all(columns, renames)),
    };
    let clusters = rule
        .clusters
        .iter()
        .map(|cluster| Cluster {
            name: rename_variant(&cluster.name, renames),
            columns: rename_all(&cluster.columns, renames),
        })
        .collect();
    Some(ScoreRule {
        questionnaire,
        columns,
        reversed_columns: rename_all(&rule.reversed_columns, renames),
        clusters,
        ..rule.clone()
    })
}

/// Returns the input rules followed by one variant per duplicable rule.
///
/// A variant whose name is already taken is skipped and reported.
pub fn expand_participant_variants(
    rules: &[ScoreRule],
    roles: &ParticipantRoles,
    renames: &VariantRenameRules,
) -> (Vec<ScoreRule>, Vec<ScoringWarning>) {
    let mut taken: BTreeSet<String> = rules
        .iter()
        .map(|rule| rule.questionnaire.clone())
        .collect();
    let mut expanded = rules.to_vec();
    let mut warnings = Vec::new();

    for rule in rules {
        if !roles.has_role(&rule.questionnaire, &renames.duplicable_role) {
            continue;
        }
        let Some(variant) = variant_of(rule, renames) else {
            debug!(questionnaire = %rule.questionnaire, "no renamable suffix, variant skipped");
            continue;
        };
        if !taken.insert(variant.questionnaire.clone()) {
            let warning = ScoringWarning::VariantExists {
                source: rule.questionnaire.clone(),
                target: variant.questionnaire,
            };
            warn!("{warning}");
            warnings.push(warning);
            continue;
        }
        debug!(source = %rule.questionnaire, target = %variant.questionnaire, "participant variant added");
        expanded.push(variant);
    }
    (expanded, warnings)
}
