use std::collections::BTreeMap;
use std::path::PathBuf;

use qmeta_catalog::{Discrepancy, QuestionnaireSummary};
use qmeta_map::QuestionnaireMapping;
use qmeta_model::{MappingWarning, QuestionInfo, QuestionType, ScoringInfo, ScoringWarning};
use qmeta_score::RejectedRule;

#[derive(Debug)]
pub struct MapReport {
    pub project: String,
    pub fingerprint: String,
    pub questionnaires: Vec<QuestionnaireMapping>,
    pub warnings: Vec<MappingWarning>,
    pub exported: Option<PathBuf>,
}

#[derive(Debug)]
pub struct CatalogReport {
    pub project: String,
    pub fingerprint: String,
    pub type_counts: BTreeMap<QuestionType, usize>,
    pub questionnaires: Vec<QuestionnaireSummary>,
    /// Set when a single questionnaire was requested.
    pub questions: Option<(String, Vec<QuestionInfo>)>,
    pub discrepancies: Vec<Discrepancy>,
    pub unmatched_mapping: Vec<String>,
}

#[derive(Debug)]
pub struct RulesReport {
    pub project: String,
    pub fingerprint: String,
    pub descriptors: Vec<ScoringInfo>,
    pub warnings: Vec<ScoringWarning>,
    pub rejected: Vec<RejectedRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreColumnSummary {
    pub questionnaire: String,
    pub column: String,
    pub scored: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug)]
pub struct ScoreReport {
    pub project: String,
    pub responses: PathBuf,
    pub rows: usize,
    pub columns: Vec<ScoreColumnSummary>,
    /// Questionnaire and reason, for every descriptor without a score.
    pub skipped: Vec<(String, String)>,
    pub output: Option<PathBuf>,
}
