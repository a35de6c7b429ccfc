//! Scoring descriptors.
//!
//! [`ScoreRule`] is the curated, serializable form. [`ScoringInfo`] is the
//! validated descriptor the scoring engine consumes: its column list is
//! resolved and the reverse-coding range invariant has been checked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Sentinel column list meaning "every scorable catalog item of the questionnaire".
pub const DEFAULT_COLUMNS: &str = "DEFAULT";

/// Questionnaires whose scoring is known but not formalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BespokeMethod {
    SwanScoring,
    SpcClinicianScoring,
    CSsrsScoring,
}

impl BespokeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BespokeMethod::SwanScoring => "swan_scoring",
            BespokeMethod::SpcClinicianScoring => "spc_clinician_scoring",
            BespokeMethod::CSsrsScoring => "c_ssrs_scoring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AggregationMethod {
    Sum,
    Average,
    SingleItem,
    NoScoringNeeded,
    MissingImplementation,
    Bespoke(BespokeMethod),
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Sum => "sum",
            AggregationMethod::Average => "average",
            AggregationMethod::SingleItem => "single_item",
            AggregationMethod::NoScoringNeeded => "no_scoring_needed",
            AggregationMethod::MissingImplementation => "missing_implementation",
            AggregationMethod::Bespoke(method) => method.as_str(),
        }
    }

    /// Whether the engine can aggregate with this method.
    pub fn is_computable(&self) -> bool {
        matches!(
            self,
            AggregationMethod::Sum | AggregationMethod::Average | AggregationMethod::SingleItem
        )
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationMethod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "sum" => Ok(AggregationMethod::Sum),
            "average" | "mean" => Ok(AggregationMethod::Average),
            "singleitem" => Ok(AggregationMethod::SingleItem),
            "noscoringneeded" => Ok(AggregationMethod::NoScoringNeeded),
            "missingimplementation" => Ok(AggregationMethod::MissingImplementation),
            "swanscoring" => Ok(AggregationMethod::Bespoke(BespokeMethod::SwanScoring)),
            "spcclinicianscoring" => Ok(AggregationMethod::Bespoke(BespokeMethod::SpcClinicianScoring)),
            "cssrsscoring" => Ok(AggregationMethod::Bespoke(BespokeMethod::CSsrsScoring)),
            _ => Err(ModelError::UnknownAggregation(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for AggregationMethod {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AggregationMethod> for String {
    fn from(method: AggregationMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Scored column list of a rule: explicit, or the `DEFAULT` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColumns", into = "RawColumns")]
pub enum ColumnSpec {
    Default,
    Listed(Vec<String>),
}

impl Default for ColumnSpec {
    fn default() -> Self {
        ColumnSpec::Listed(Vec::new())
    }
}

impl ColumnSpec {
    pub fn listed(&self) -> Option<&[String]> {
        match self {
            ColumnSpec::Default => None,
            ColumnSpec::Listed(columns) => Some(columns),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawColumns {
    Sentinel(String),
    List(Vec<String>),
}

impl TryFrom<RawColumns> for ColumnSpec {
    type Error = String;

    fn try_from(raw: RawColumns) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawColumns::Sentinel(value) if value.trim().eq_ignore_ascii_case(DEFAULT_COLUMNS) => {
                Ok(ColumnSpec::Default)
            }
            RawColumns::Sentinel(value) => Err(format!(
                "columns must be a list or \"{DEFAULT_COLUMNS}\", got \"{value}\""
            )),
            RawColumns::List(columns) => Ok(ColumnSpec::Listed(columns)),
        }
    }
}

impl From<ColumnSpec> for RawColumns {
    fn from(spec: ColumnSpec) -> Self {
        match spec {
            ColumnSpec::Default => RawColumns::Sentinel(DEFAULT_COLUMNS.to_string()),
            ColumnSpec::Listed(columns) => RawColumns::List(columns),
        }
    }
}

/// Named subscale over a subset of the scored columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub columns: Vec<String>,
}

impl Cluster {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Curated scoring rule for one questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRule {
    pub questionnaire: String,
    pub method: AggregationMethod,
    #[serde(default)]
    pub columns: ColumnSpec,
    #[serde(default)]
    pub reversed_columns: Vec<String>,
    #[serde(default, rename = "cluster")]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub need_clarification: bool,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub require_step_adjustment: bool,
}

impl ScoreRule {
    pub fn new(questionnaire: impl Into<String>, method: AggregationMethod, columns: ColumnSpec) -> Self {
        Self {
            questionnaire: questionnaire.into(),
            method,
            columns,
            reversed_columns: Vec::new(),
            clusters: Vec::new(),
            need_clarification: false,
            min_value: None,
            max_value: None,
            require_step_adjustment: false,
        }
    }

    #[must_use]
    pub fn with_reversed<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reversed_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.clusters.push(cluster);
        self
    }

    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }
}

/// Validated scoring descriptor.
///
/// Fields are private so the reverse-coding range invariant holds for every
/// value of this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringInfo {
    questionnaire: String,
    method: AggregationMethod,
    columns: Vec<String>,
    reversed_columns: Vec<String>,
    clusters: Vec<Cluster>,
    need_clarification: bool,
    min_value: Option<f64>,
    max_value: Option<f64>,
    require_step_adjustment: bool,
}

impl ScoringInfo {
    /// Validates a rule whose column list is already resolved.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnresolvedColumns`] when the rule still uses `DEFAULT`.
    /// - [`ModelError::MissingScoreRange`] when reversed columns lack min/max.
    /// - [`ModelError::InvalidScoreRange`] when min exceeds max.
    pub fn try_from_rule(rule: ScoreRule) -> Result<Self> {
        let ScoreRule {
            questionnaire,
            method,
            columns,
            reversed_columns,
            clusters,
            need_clarification,
            min_value,
            max_value,
            require_step_adjustment,
        } = rule;
        let ColumnSpec::Listed(columns) = columns else {
            return Err(ModelError::UnresolvedColumns { questionnaire });
        };
        if !reversed_columns.is_empty() && (min_value.is_none() || max_value.is_none()) {
            return Err(ModelError::MissingScoreRange {
                questionnaire,
                count: reversed_columns.len(),
            });
        }
        if let (Some(min), Some(max)) = (min_value, max_value)
            && min > max
        {
            return Err(ModelError::InvalidScoreRange {
                questionnaire,
                min,
                max,
            });
        }
        Ok(Self {
            questionnaire,
            method,
            columns,
            reversed_columns,
            clusters,
            need_clarification,
            min_value,
            max_value,
            require_step_adjustment,
        })
    }

    pub fn questionnaire(&self) -> &str {
        &self.questionnaire
    }

    pub fn method(&self) -> AggregationMethod {
        self.method
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn reversed_columns(&self) -> &[String] {
        &self.reversed_columns
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn need_clarification(&self) -> bool {
        self.need_clarification
    }

    pub fn min_value(&self) -> Option<f64> {
        self.min_value
    }

    pub fn max_value(&self) -> Option<f64> {
        self.max_value
    }

    pub fn require_step_adjustment(&self) -> bool {
        self.require_step_adjustment
    }

    /// `(min, max)` when both are declared.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.min_value?, self.max_value?))
    }

    /// Name of the main score column.
    pub fn score_column_name(&self) -> String {
        format!("{}_score", self.questionnaire)
    }
}

/// Non-fatal findings from building the score registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringWarning {
    ReversedNotScored {
        questionnaire: String,
        column: String,
    },
    DuplicateColumn {
        questionnaire: String,
        column: String,
    },
    DuplicateReversed {
        questionnaire: String,
        column: String,
    },
    ColumnInMultipleClusters {
        questionnaire: String,
        column: String,
        clusters: Vec<String>,
    },
    ClusterColumnMissing {
        questionnaire: String,
        cluster: String,
        column: String,
    },
    ColumnNotInCatalog {
        questionnaire: String,
        column: String,
    },
    EmptyDefaultColumns {
        questionnaire: String,
    },
    VariantExists {
        source: String,
        target: String,
    },
}

impl ScoringWarning {
    pub fn questionnaire(&self) -> &str {
        match self {
            ScoringWarning::ReversedNotScored { questionnaire, .. }
            | ScoringWarning::DuplicateColumn { questionnaire, .. }
            | ScoringWarning::DuplicateReversed { questionnaire, .. }
            | ScoringWarning::ColumnInMultipleClusters { questionnaire, .. }
            | ScoringWarning::ClusterColumnMissing { questionnaire, .. }
            | ScoringWarning::ColumnNotInCatalog { questionnaire, .. }
            | ScoringWarning::EmptyDefaultColumns { questionnaire } => questionnaire,
            ScoringWarning::VariantExists { target, .. } => target,
        }
    }
}

impl fmt::Display for ScoringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringWarning::ReversedNotScored {
                questionnaire,
                column,
            } => write!(f, "{questionnaire}: reversed column {column} is not scored"),
            ScoringWarning::DuplicateColumn {
                questionnaire,
                column,
            } => write!(f, "{questionnaire}: column {column} listed more than once"),
            ScoringWarning::DuplicateReversed {
                questionnaire,
                column,
            } => write!(f, "{questionnaire}: reversed column {column} listed more than once"),
            ScoringWarning::ColumnInMultipleClusters {
                questionnaire,
                column,
                clusters,
            } => write!(
                f,
                "{questionnaire}: column {column} appears in clusters {}",
                clusters.join(", ")
            ),
            ScoringWarning::ClusterColumnMissing {
                questionnaire,
                cluster,
                column,
            } => write!(
                f,
                "{questionnaire}: cluster {cluster} column {column} is not in the catalog"
            ),
            ScoringWarning::ColumnNotInCatalog {
                questionnaire,
                column,
            } => write!(f, "{questionnaire}: column {column} is not in the catalog"),
            ScoringWarning::EmptyDefaultColumns { questionnaire } => write!(
                f,
                "{questionnaire}: DEFAULT columns resolved to no catalog questions"
            ),
            ScoringWarning::VariantExists { source, target } => write!(
                f,
                "{target}: already defined, variant of {source} not generated"
            ),
        }
    }
}
