//! Curated score rule sets.
//!
//! Rules are kept as TOML so they can be reviewed by the people who own the
//! questionnaires. A bundled set ships with the crate and a project may
//! replace it with its own file.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use qmeta_model::ScoreRule;

use crate::error::{Result, ScoreError};

/// Rule file embedded at compile time.
pub const BUILTIN_RULES: &str = include_str!("../data/score_rules.toml");

/// Ordered score rules, at most one per questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRuleSet {
    #[serde(default, rename = "rule")]
    rules: Vec<ScoreRule>,
}

impl ScoreRuleSet {
    /// # Errors
    ///
    /// Returns [`ScoreError::DuplicateRule`] when a questionnaire repeats.
    pub fn new(rules: Vec<ScoreRule>) -> Result<Self> {
        let set = Self { rules };
        set.check_unique("rule list")?;
        Ok(set)
    }

    /// The bundled rule set.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded file is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_RULES, "bundled rules")
    }

    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or repeats a
    /// questionnaire.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Parses `[[rule]]` tables; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::Rules`] on malformed TOML or unknown methods.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let set: Self = toml::from_str(text).map_err(|source| ScoreError::Rules {
            origin: origin.to_string(),
            source,
        })?;
        set.check_unique(origin)?;
        debug!(origin, rules = set.rules.len(), "score rules parsed");
        Ok(set)
    }

    fn check_unique(&self, origin: &str) -> Result<()> {
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.questionnaire.as_str()) {
                return Err(ScoreError::DuplicateRule {
                    origin: origin.to_string(),
                    questionnaire: rule.questionnaire.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn rules(&self) -> &[ScoreRule] {
        &self.rules
    }

    pub fn get(&self, questionnaire: &str) -> Option<&ScoreRule> {
        self.rules
            .iter()
            .find(|rule| rule.questionnaire == questionnaire)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
