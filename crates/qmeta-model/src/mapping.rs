//! Reconciliation rules and canonical mapping rows.
//!
//! Two electronic-forms systems (A and B) and one companion short-survey
//! system name the same question independently. A [`ColumnMappingRow`]
//! records how each of them names one canonical question.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// How the mapping engine builds rows for one questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationRule {
    /// System A drives; system B and the companion are attached.
    Default,
    /// System A drives; system B is never attached.
    SourceAOnly,
    /// System A lists extra questions; handled like [`TransformationRule::Default`].
    ExtraInSourceA,
    /// System B drives because its column set is the superset.
    ExtraInSourceB,
    /// Rows come only from the companion rename table.
    CompanionOnly,
}

impl TransformationRule {
    pub const ALL: [TransformationRule; 5] = [
        TransformationRule::Default,
        TransformationRule::SourceAOnly,
        TransformationRule::ExtraInSourceA,
        TransformationRule::ExtraInSourceB,
        TransformationRule::CompanionOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationRule::Default => "DEFAULT",
            TransformationRule::SourceAOnly => "SOURCE_A_ONLY",
            TransformationRule::ExtraInSourceA => "EXTRA_IN_SOURCE_A",
            TransformationRule::ExtraInSourceB => "EXTRA_IN_SOURCE_B",
            TransformationRule::CompanionOnly => "COMPANION_ONLY",
        }
    }

    /// Parses a rule for `questionnaire`; unknown rule names are fatal.
    pub fn parse_for(questionnaire: &str, raw: &str) -> Result<Self> {
        raw.parse().map_err(|_| ModelError::UnknownRule {
            questionnaire: questionnaire.to_string(),
            rule: raw.trim().to_string(),
        })
    }
}

impl fmt::Display for TransformationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransformationRule {
    type Err = String;

    /// Accepts the canonical names case-insensitively, with spaces or
    /// hyphens in place of underscores.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "DEFAULT" => Ok(TransformationRule::Default),
            "SOURCE_A_ONLY" => Ok(TransformationRule::SourceAOnly),
            "EXTRA_IN_SOURCE_A" => Ok(TransformationRule::ExtraInSourceA),
            "EXTRA_IN_SOURCE_B" => Ok(TransformationRule::ExtraInSourceB),
            "COMPANION_ONLY" => Ok(TransformationRule::CompanionOnly),
            _ => Err(format!("Unknown transformation rule: {s}")),
        }
    }
}

/// One of the three capture systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceSystem {
    SourceA,
    SourceB,
    Companion,
}

impl SourceSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSystem::SourceA => "source_a",
            SourceSystem::SourceB => "source_b",
            SourceSystem::Companion => "companion",
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which capture systems contribute to a mapping row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Only the electronic-forms systems.
    Forms,
    /// Only the companion system.
    Companion,
    /// A forms system and the companion system.
    Both,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Forms => "forms",
            Provenance::Companion => "companion",
            Provenance::Both => "both",
        }
    }

    /// Derives the tag from which system names are present.
    pub fn derive(has_forms: bool, has_companion: bool) -> Self {
        match (has_forms, has_companion) {
            (true, true) => Provenance::Both,
            (false, true) => Provenance::Companion,
            _ => Provenance::Forms,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forms" => Ok(Provenance::Forms),
            "companion" => Ok(Provenance::Companion),
            "both" => Ok(Provenance::Both),
            _ => Err(format!("Unknown provenance: {s}")),
        }
    }
}

/// How one canonical question is named in each capture system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMappingRow {
    pub questionnaire: String,
    /// Questionnaire name after alias resolution.
    pub display_questionnaire: String,
    pub canonical_name: String,
    pub source_a_name: Option<String>,
    pub source_b_name: Option<String>,
    pub companion_name: Option<String>,
    pub companion_match_type: Option<String>,
    pub original_companion_name: Option<String>,
    pub imputation_source: Option<String>,
    pub provenance: Provenance,
}

impl ColumnMappingRow {
    /// Builds a row and derives its provenance tag.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyMappingRow`] when no system names the question.
    pub fn new(
        questionnaire: impl Into<String>,
        display_questionnaire: impl Into<String>,
        canonical_name: impl Into<String>,
        names: SystemNames,
    ) -> Result<Self> {
        let questionnaire = questionnaire.into();
        let canonical_name = canonical_name.into();
        if names.is_empty() {
            return Err(ModelError::EmptyMappingRow {
                questionnaire,
                canonical_name,
            });
        }
        let provenance = Provenance::derive(
            names.source_a.is_some() || names.source_b.is_some(),
            names.companion.is_some(),
        );
        Ok(Self {
            questionnaire,
            display_questionnaire: display_questionnaire.into(),
            canonical_name,
            source_a_name: names.source_a,
            source_b_name: names.source_b,
            companion_name: names.companion,
            companion_match_type: None,
            original_companion_name: None,
            imputation_source: None,
            provenance,
        })
    }

    #[must_use]
    pub fn with_companion_details(
        mut self,
        match_type: Option<String>,
        original_name: Option<String>,
    ) -> Self {
        self.companion_match_type = match_type;
        self.original_companion_name = original_name;
        self
    }

    #[must_use]
    pub fn with_imputation_source(mut self, source: Option<String>) -> Self {
        self.imputation_source = source;
        self
    }

    /// Name used by `system`, if any.
    pub fn name_in(&self, system: SourceSystem) -> Option<&str> {
        match system {
            SourceSystem::SourceA => self.source_a_name.as_deref(),
            SourceSystem::SourceB => self.source_b_name.as_deref(),
            SourceSystem::Companion => self.companion_name.as_deref(),
        }
    }
}

/// Per-system names handed to [`ColumnMappingRow::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemNames {
    pub source_a: Option<String>,
    pub source_b: Option<String>,
    pub companion: Option<String>,
}

impl SystemNames {
    pub fn is_empty(&self) -> bool {
        self.source_a.is_none() && self.source_b.is_none() && self.companion.is_none()
    }
}

/// Non-fatal findings from reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingWarning {
    /// A companion entry that no row consumed.
    UnconsumedCompanion {
        questionnaire: String,
        canonical_name: Option<String>,
        companion_name: String,
    },
    /// The driving system lists no columns for a rule-table questionnaire.
    MissingDriverList {
        questionnaire: String,
        system: SourceSystem,
    },
    /// A companion-only entry collides with an already emitted canonical name.
    DuplicateCanonical {
        questionnaire: String,
        canonical_name: String,
    },
}

impl MappingWarning {
    pub fn questionnaire(&self) -> &str {
        match self {
            MappingWarning::UnconsumedCompanion { questionnaire, .. }
            | MappingWarning::MissingDriverList { questionnaire, .. }
            | MappingWarning::DuplicateCanonical { questionnaire, .. } => questionnaire,
        }
    }
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingWarning::UnconsumedCompanion {
                questionnaire,
                canonical_name,
                companion_name,
            } => match canonical_name {
                Some(canonical) => write!(
                    f,
                    "{questionnaire}: companion column {companion_name} ({canonical}) was not mapped"
                ),
                None => write!(
                    f,
                    "{questionnaire}: companion column {companion_name} was not mapped"
                ),
            },
            MappingWarning::MissingDriverList {
                questionnaire,
                system,
            } => write!(f, "{questionnaire}: {system} lists no columns"),
            MappingWarning::DuplicateCanonical {
                questionnaire,
                canonical_name,
            } => write!(
                f,
                "{questionnaire}: {canonical_name} already mapped, companion row skipped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_parsing_is_lenient_about_separators() {
        assert_eq!(
            "source a only".parse::<TransformationRule>().unwrap(),
            TransformationRule::SourceAOnly
        );
        assert_eq!(
            "Extra-In-Source-B".parse::<TransformationRule>().unwrap(),
            TransformationRule::ExtraInSourceB
        );
        for rule in TransformationRule::ALL {
            assert_eq!(rule.as_str().parse::<TransformationRule>().unwrap(), rule);
        }
    }

    #[test]
    fn unknown_rule_names_the_questionnaire() {
        let error = TransformationRule::parse_for("sdq", "STEPPED").unwrap_err();
        assert!(matches!(error, ModelError::UnknownRule { ref questionnaire, .. } if questionnaire == "sdq"));
    }

    #[test]
    fn provenance_from_present_systems() {
        assert_eq!(Provenance::derive(true, false), Provenance::Forms);
        assert_eq!(Provenance::derive(false, true), Provenance::Companion);
        assert_eq!(Provenance::derive(true, true), Provenance::Both);
    }

    #[test]
    fn empty_rows_are_rejected() {
        let result = ColumnMappingRow::new("sdq", "sdq", "sdq_1", SystemNames::default());
        assert!(matches!(result, Err(ModelError::EmptyMappingRow { .. })));

        let row = ColumnMappingRow::new(
            "sdq",
            "sdq",
            "sdq_1",
            SystemNames {
                source_b: Some("sdq_1".to_string()),
                companion: Some("SDQ1".to_string()),
                ..SystemNames::default()
            },
        )
        .unwrap();
        assert_eq!(row.provenance, Provenance::Both);
        assert_eq!(row.name_in(SourceSystem::SourceA), None);
    }
}
