//! Configuration options for catalog assembly and scoring.

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantRole;

/// Catalog assembly options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    /// Attach a validator to every catalog question.
    pub include_validator: bool,
    /// Resolve form names through the questionnaire alias table.
    pub rename_questionnaires: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            include_validator: true,
            rename_questionnaires: true,
        }
    }
}

impl CatalogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_validator(mut self, enable: bool) -> Self {
        self.include_validator = enable;
        self
    }

    #[must_use]
    pub fn with_questionnaire_renames(mut self, enable: bool) -> Self {
        self.rename_questionnaires = enable;
        self
    }
}

/// Scoring engine options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// A score is nulled when the fraction of missing inputs exceeds this value.
    pub missing_threshold: f64,
}

impl ScoringOptions {
    pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.5;

    #[must_use]
    pub fn with_missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = threshold;
        self
    }
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            missing_threshold: Self::DEFAULT_MISSING_THRESHOLD,
        }
    }
}

/// Replaces one trailing name segment with another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    pub from: String,
    pub to: String,
}

impl SuffixRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Participant-variant expansion configuration.
///
/// Rules are tried in order; the first whose `from` equals a name's trailing
/// segment is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantRenameRules {
    pub duplicable_role: ParticipantRole,
    pub rules: Vec<SuffixRule>,
}

impl Default for VariantRenameRules {
    fn default() -> Self {
        Self {
            duplicable_role: ParticipantRole::Mother,
            rules: vec![SuffixRule::new("m", "f"), SuffixRule::new("mother", "father")],
        }
    }
}

impl VariantRenameRules {
    pub fn new(duplicable_role: ParticipantRole, rules: Vec<SuffixRule>) -> Self {
        Self {
            duplicable_role,
            rules,
        }
    }
}
