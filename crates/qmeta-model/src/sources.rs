//! Source column registries and the auxiliary lookup tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::mapping::TransformationRule;

/// Column names per questionnaire for one electronic-forms system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRegistry {
    questionnaires: BTreeMap<String, Vec<String>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a questionnaire from its comma-joined column list.
    ///
    /// Blank entries are dropped and repeated names are kept once, in first-seen order.
    /// A questionnaire registered twice accumulates both lists.
    pub fn insert_joined(&mut self, questionnaire: &str, joined: &str) {
        self.insert(questionnaire, joined.split(','));
    }

    pub fn insert<I, S>(&mut self, questionnaire: &str, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self
            .questionnaires
            .entry(questionnaire.trim().to_string())
            .or_default();
        for column in columns {
            let column = column.as_ref().trim();
            if column.is_empty() || entry.iter().any(|existing| existing == column) {
                continue;
            }
            entry.push(column.to_string());
        }
    }

    /// Columns listed for `questionnaire`, or `None` when it is not registered.
    pub fn columns(&self, questionnaire: &str) -> Option<&[String]> {
        self.questionnaires.get(questionnaire).map(Vec::as_slice)
    }

    pub fn lists(&self, questionnaire: &str, column: &str) -> bool {
        self.columns(questionnaire)
            .is_some_and(|columns| columns.iter().any(|c| c == column))
    }

    pub fn questionnaires(&self) -> impl Iterator<Item = &str> {
        self.questionnaires.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.questionnaires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questionnaires.is_empty()
    }
}

/// The two electronic-forms registries.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistries {
    pub source_a: SourceRegistry,
    pub source_b: SourceRegistry,
}

/// One row of the companion-system rename table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionEntry {
    pub questionnaire: String,
    /// Canonical name this companion column attaches to; `None` for companion-only questions.
    pub canonical_name: Option<String>,
    pub companion_name: String,
    pub match_type: Option<String>,
    pub original_companion_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanionTable {
    entries: Vec<CompanionEntry>,
}

impl CompanionTable {
    /// Builds the table, dropping exact duplicate rows.
    pub fn new(entries: Vec<CompanionEntry>) -> Self {
        let mut unique: Vec<CompanionEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !unique.contains(&entry) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    pub fn entries(&self) -> &[CompanionEntry] {
        &self.entries
    }

    /// Entries for `questionnaire` with their table positions.
    pub fn for_questionnaire<'a, 'q>(
        &'a self,
        questionnaire: &'q str,
    ) -> impl Iterator<Item = (usize, &'a CompanionEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| entry.questionnaire == questionnaire)
    }

    /// First entry matching `(questionnaire, canonical_name)` exactly.
    pub fn find(&self, questionnaire: &str, canonical_name: &str) -> Option<(usize, &CompanionEntry)> {
        self.for_questionnaire(questionnaire)
            .find(|(_, entry)| entry.canonical_name.as_deref() == Some(canonical_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Imputed column name to the original column it was derived from.
#[derive(Debug, Clone, Default)]
pub struct ImputationTable {
    by_new_name: BTreeMap<String, String>,
}

impl ImputationTable {
    /// Builds the table; the first row for a new name wins.
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut by_new_name = BTreeMap::new();
        for (new_name, original) in pairs {
            by_new_name.entry(new_name).or_insert(original);
        }
        Self { by_new_name }
    }

    pub fn original_for(&self, new_name: &str) -> Option<&str> {
        self.by_new_name.get(new_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_new_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_new_name.is_empty()
    }
}

/// Column names that are never emitted.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    names: BTreeSet<String>,
}

impl ExclusionList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Bidirectional questionnaire alias table.
///
/// Aliases are the names used by the forms systems; the canonical side is
/// the name the companion system and the display layer use.
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireAliases {
    alias_to_canonical: BTreeMap<String, String>,
    canonical_to_alias: BTreeMap<String, String>,
}

impl QuestionnaireAliases {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut aliases = Self::default();
        for (alias, canonical) in pairs {
            aliases
                .canonical_to_alias
                .entry(canonical.clone())
                .or_insert_with(|| alias.clone());
            aliases.alias_to_canonical.entry(alias).or_insert(canonical);
        }
        aliases
    }

    /// Canonical name for `name`, or `name` itself when it is not an alias.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.alias_to_canonical
            .get(name)
            .map_or(name, String::as_str)
    }

    pub fn alias_of(&self, canonical: &str) -> Option<&str> {
        self.canonical_to_alias.get(canonical).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.alias_to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alias_to_canonical.is_empty()
    }
}

/// Pure lookup data consumed by the mapping engine.
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryTables {
    pub companion: CompanionTable,
    pub imputation: ImputationTable,
    pub exclusions: ExclusionList,
    pub aliases: QuestionnaireAliases,
}

/// Questionnaire name to transformation rule, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: Vec<(String, TransformationRule)>,
}

impl RuleTable {
    /// Builds the table from raw `(questionnaire, rule)` strings.
    ///
    /// # Errors
    ///
    /// Unknown rule names and conflicting rules for one questionnaire are fatal.
    pub fn from_raw<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = Self::default();
        for (questionnaire, raw) in rows {
            let rule = TransformationRule::parse_for(&questionnaire, &raw)?;
            table.insert(questionnaire, rule)?;
        }
        Ok(table)
    }

    /// Adds a rule; repeating the same rule is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ConflictingRule`] when the questionnaire already has a different rule.
    pub fn insert(&mut self, questionnaire: String, rule: TransformationRule) -> Result<()> {
        if let Some((_, existing)) = self.entries.iter().find(|(name, _)| *name == questionnaire) {
            if *existing == rule {
                return Ok(());
            }
            return Err(ModelError::ConflictingRule {
                questionnaire,
                first: existing.to_string(),
                second: rule.to_string(),
            });
        }
        self.entries.push((questionnaire, rule));
        Ok(())
    }

    pub fn rule_for(&self, questionnaire: &str) -> Option<TransformationRule> {
        self.entries
            .iter()
            .find(|(name, _)| name == questionnaire)
            .map(|(_, rule)| *rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TransformationRule)> {
        self.entries.iter().map(|(name, rule)| (name.as_str(), *rule))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_splits_and_dedupes_columns() {
        let mut registry = SourceRegistry::new();
        registry.insert_joined("sdq", "sdq_1, sdq_2,,sdq_1");
        assert_eq!(
            registry.columns("sdq").unwrap(),
            ["sdq_1".to_string(), "sdq_2".to_string()]
        );
        assert!(registry.lists("sdq", "sdq_2"));
        assert!(!registry.lists("mfq", "sdq_2"));
        assert!(registry.columns("mfq").is_none());
    }

    #[test]
    fn aliases_resolve_both_ways() {
        let aliases = QuestionnaireAliases::new(vec![("dass21_m".to_string(), "dass_m".to_string())]);
        assert_eq!(aliases.canonical_name("dass21_m"), "dass_m");
        assert_eq!(aliases.canonical_name("sdq"), "sdq");
        assert_eq!(aliases.alias_of("dass_m"), Some("dass21_m"));
    }

    #[test]
    fn rule_table_rejects_conflicts() {
        let table = RuleTable::from_raw(vec![
            ("sdq".to_string(), "DEFAULT".to_string()),
            ("sdq".to_string(), "DEFAULT".to_string()),
        ])
        .unwrap();
        assert_eq!(table.len(), 1);

        let conflict = RuleTable::from_raw(vec![
            ("sdq".to_string(), "DEFAULT".to_string()),
            ("sdq".to_string(), "COMPANION_ONLY".to_string()),
        ]);
        assert!(matches!(conflict, Err(ModelError::ConflictingRule { .. })));

        let unknown = RuleTable::from_raw(vec![("sdq".to_string(), "FUZZY".to_string())]);
        assert!(matches!(unknown, Err(ModelError::UnknownRule { .. })));
    }

    #[test]
    fn companion_lookup_is_exact() {
        let table = CompanionTable::new(vec![
            CompanionEntry {
                questionnaire: "sdq".to_string(),
                canonical_name: Some("sdq_1".to_string()),
                companion_name: "SDQ_Q1".to_string(),
                match_type: Some("exact".to_string()),
                original_companion_name: None,
            },
            CompanionEntry {
                questionnaire: "sdq".to_string(),
                canonical_name: None,
                companion_name: "SDQ_extra".to_string(),
                match_type: None,
                original_companion_name: None,
            },
        ]);
        assert_eq!(table.find("sdq", "sdq_1").map(|(idx, _)| idx), Some(0));
        assert!(table.find("sdq", "SDQ_1").is_none());
        assert_eq!(table.for_questionnaire("sdq").count(), 2);
    }
}
