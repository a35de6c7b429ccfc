//! Score registry assembly.
//!
//! Build order matters: variants are expanded before `DEFAULT` lists are
//! resolved, so a paternal copy picks up its own catalog questions rather
//! than renamed maternal ones.

use std::collections::BTreeMap;

use tracing::{info, info_span, warn};

use qmeta_catalog::QuestionCatalog;
use qmeta_model::{
    ModelError, ParticipantRoles, ScoreRule, ScoringInfo, ScoringWarning, VariantRenameRules,
};

use crate::resolve::{fill_score_ranges, resolve_default_columns};
use crate::validate::validate_rule;
use crate::variants::expand_participant_variants;

/// Validated scoring descriptors keyed by questionnaire.
#[derive(Debug, Clone, Default)]
pub struct ScoreRegistry {
    infos: Vec<ScoringInfo>,
    index: BTreeMap<String, usize>,
}

impl ScoreRegistry {
    /// Later descriptors replace earlier ones with the same questionnaire.
    pub fn from_infos(infos: Vec<ScoringInfo>) -> Self {
        let mut registry = Self::default();
        for info in infos {
            registry.insert(info);
        }
        registry
    }

    fn insert(&mut self, info: ScoringInfo) {
        match self.index.get(info.questionnaire()) {
            Some(&position) => self.infos[position] = info,
            None => {
                self.index
                    .insert(info.questionnaire().to_string(), self.infos.len());
                self.infos.push(info);
            }
        }
    }

    pub fn get(&self, questionnaire: &str) -> Option<&ScoringInfo> {
        self.index
            .get(questionnaire)
            .map(|position| &self.infos[*position])
    }

    pub fn contains(&self, questionnaire: &str) -> bool {
        self.index.contains_key(questionnaire)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoringInfo> {
        self.infos.iter()
    }

    pub fn questionnaires(&self) -> impl Iterator<Item = &str> {
        self.infos.iter().map(ScoringInfo::questionnaire)
    }

    /// Descriptors the engine can aggregate.
    pub fn computable(&self) -> impl Iterator<Item = &ScoringInfo> {
        self.infos.iter().filter(|info| info.method().is_computable())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// A rule that failed descriptor validation.
#[derive(Debug)]
pub struct RejectedRule {
    pub questionnaire: String,
    pub error: ModelError,
}

/// Registry plus everything reported while building it.
#[derive(Debug)]
pub struct RegistryBuild {
    pub registry: ScoreRegistry,
    pub warnings: Vec<ScoringWarning>,
    pub rejected: Vec<RejectedRule>,
}

/// Collaborators the registry build reads from.
#[derive(Debug, Clone, Copy)]
pub struct RegistryContext<'a> {
    pub catalog: &'a QuestionCatalog,
    pub roles: &'a ParticipantRoles,
    pub renames: &'a VariantRenameRules,
}

/// Expand, resolve, validate and convert `rules` into a registry.
///
/// Rules missing a min/max for reverse coding are rejected individually; the
/// rest of the registry is still built.
pub fn build_registry(rules: &[ScoreRule], context: RegistryContext<'_>) -> RegistryBuild {
    let span = info_span!("score_rules", rules = rules.len());
    let _guard = span.enter();

    let (expanded, mut warnings) =
        expand_participant_variants(rules, context.roles, context.renames);
    let (resolved, resolve_warnings) = resolve_default_columns(expanded, context.catalog);
    warnings.extend(resolve_warnings);
    let resolved = fill_score_ranges(resolved, context.catalog);

    let mut infos = Vec::with_capacity(resolved.len());
    let mut rejected = Vec::new();
    for rule in resolved {
        let findings = validate_rule(&rule, Some(context.catalog));
        for warning in &findings {
            warn!("{warning}");
        }
        warnings.extend(findings);

        let questionnaire = rule.questionnaire.clone();
        match ScoringInfo::try_from_rule(rule) {
            Ok(info) => infos.push(info),
            Err(error) => {
                warn!(questionnaire = %questionnaire, %error, "score rule rejected");
                rejected.push(RejectedRule {
                    questionnaire,
                    error,
                });
            }
        }
    }

    let registry = ScoreRegistry::from_infos(infos);
    info!(
        descriptors = registry.len(),
        warnings = warnings.len(),
        rejected = rejected.len(),
        "score registry built"
    );
    RegistryBuild {
        registry,
        warnings,
        rejected,
    }
}
