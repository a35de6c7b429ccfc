//! Consistency checks over resolved score rules.
//!
//! Every finding here is a [`ScoringWarning`]; none stops the registry build.

use std::collections::{BTreeMap, BTreeSet};

use qmeta_catalog::QuestionCatalog;
use qmeta_model::{ScoreRule, ScoringWarning};

fn duplicates(names: &[String]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut repeated = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) && !repeated.contains(&name.as_str()) {
            repeated.push(name.as_str());
        }
    }
    repeated
}

/// Structural and catalog checks for one rule with listed columns.
pub fn validate_rule(rule: &ScoreRule, catalog: Option<&QuestionCatalog>) -> Vec<ScoringWarning> {
    let questionnaire = || rule.questionnaire.clone();
    let mut warnings = Vec::new();
    let columns = rule.columns.listed().unwrap_or_default();

    for column in duplicates(columns) {
        warnings.push(ScoringWarning::DuplicateColumn {
            questionnaire: questionnaire(),
            column: column.to_string(),
        });
    }
    for column in duplicates(&rule.reversed_columns) {
        warnings.push(ScoringWarning::DuplicateReversed {
            questionnaire: questionnaire(),
            column: column.to_string(),
        });
    }
    for column in &rule.reversed_columns {
        if !columns.contains(column) {
            warnings.push(ScoringWarning::ReversedNotScored {
                questionnaire: questionnaire(),
                column: column.clone(),
            });
        }
    }

    let mut memberships: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for cluster in &rule.clusters {
        for column in &cluster.columns {
            let owners = memberships.entry(column.as_str()).or_default();
            if !owners.contains(&cluster.name) {
                owners.push(cluster.name.clone());
            }
        }
    }
    for (column, clusters) in memberships {
        if clusters.len() > 1 {
            warnings.push(ScoringWarning::ColumnInMultipleClusters {
                questionnaire: questionnaire(),
                column: column.to_string(),
                clusters,
            });
        }
    }

    if let Some(catalog) = catalog {
        for column in columns {
            if !catalog.contains(column) {
                warnings.push(ScoringWarning::ColumnNotInCatalog {
                    questionnaire: questionnaire(),
                    column: column.clone(),
                });
            }
        }
        for cluster in &rule.clusters {
            for column in &cluster.columns {
                if !catalog.contains(column) {
                    warnings.push(ScoringWarning::ClusterColumnMissing {
                        questionnaire: questionnaire(),
                        cluster: cluster.name.clone(),
                        column: column.clone(),
                    });
                }
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmeta_model::{AggregationMethod, Cluster, ColumnSpec, QuestionInfo, QuestionType};

    fn listed(names: &[&str]) -> ColumnSpec {
        ColumnSpec::Listed(names.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn structural_findings() {
        let rule = ScoreRule::new("sdq", AggregationMethod::Sum, listed(&["sdq_1", "sdq_2", "sdq_1"]))
            .with_reversed(["sdq_2", "sdq_9", "sdq_2"])
            .with_cluster(Cluster::new("emo", ["sdq_1", "sdq_2"]))
            .with_cluster(Cluster::new("peer", ["sdq_2"]));
        let warnings = validate_rule(&rule, None);
        let rendered: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(rendered.join("\n"), @r"
        sdq: column sdq_1 listed more than once
        sdq: reversed column sdq_2 listed more than once
        sdq: reversed column sdq_9 is not scored
        sdq: column sdq_2 appears in clusters emo, peer
        ");
    }

    #[test]
    fn catalog_findings() {
        let catalog = qmeta_catalog::QuestionCatalog::from_questions(vec![QuestionInfo::new(
            "erq_1_f",
            "text",
            QuestionType::Ordinal,
            "erq_f",
        )])
        .unwrap();
        let rule = ScoreRule::new("erq_f", AggregationMethod::Sum, listed(&["erq_1_f", "erq_2_f"]))
            .with_cluster(Cluster::new("Suppression_f", ["erq_2_f"]));
        let warnings = validate_rule(&rule, Some(&catalog));
        assert_eq!(
            warnings,
            [
                ScoringWarning::ColumnNotInCatalog {
                    questionnaire: "erq_f".to_string(),
                    column: "erq_2_f".to_string(),
                },
                ScoringWarning::ClusterColumnMissing {
                    questionnaire: "erq_f".to_string(),
                    cluster: "Suppression_f".to_string(),
                    column: "erq_2_f".to_string(),
                },
            ]
        );
    }
}
