//! Score rules and questionnaire scoring.
//!
//! Curated [`ScoreRuleSet`]s are expanded for participant variants, resolved
//! against the question catalog and validated into a [`ScoreRegistry`]. The
//! engine then turns response tables into questionnaire and subscale scores.

pub mod engine;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod rules;
pub mod validate;
pub mod variants;

pub use engine::{
    BatchScore, ScoreOutcome, ScoredFrame, aggregate, missing_ratio, reverse_value, score,
    score_all, score_registry,
};
pub use error::{Result, ScoreError};
pub use registry::{RegistryBuild, RegistryContext, RejectedRule, ScoreRegistry, build_registry};
pub use resolve::{default_columns, derive_score_range, fill_score_ranges, resolve_default_columns};
pub use rules::{BUILTIN_RULES, ScoreRuleSet};
pub use validate::validate_rule;
pub use variants::{expand_participant_variants, rename_variant, variant_of};
