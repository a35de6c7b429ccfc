//! Typed question metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mapping::Provenance;
use crate::validator::{Bounds, Validator};

/// Semantic type inferred for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionType {
    Binary,
    CategoricalBinary,
    Numeric,
    Ordinal,
    Categorical,
    Textual,
    Date,
    Slider,
    NoType,
}

impl QuestionType {
    pub const ALL: [QuestionType; 9] = [
        QuestionType::Binary,
        QuestionType::CategoricalBinary,
        QuestionType::Numeric,
        QuestionType::Ordinal,
        QuestionType::Categorical,
        QuestionType::Textual,
        QuestionType::Date,
        QuestionType::Slider,
        QuestionType::NoType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Binary => "Binary",
            QuestionType::CategoricalBinary => "Categorical Binary",
            QuestionType::Numeric => "Numeric",
            QuestionType::Ordinal => "Ordinal",
            QuestionType::Categorical => "Categorical",
            QuestionType::Textual => "Textual",
            QuestionType::Date => "Date",
            QuestionType::Slider => "Slider",
            QuestionType::NoType => "None",
        }
    }

    /// Whether questions of this type carry an enumerable choice set.
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            QuestionType::CategoricalBinary | QuestionType::Ordinal | QuestionType::Categorical
        )
    }

    /// Whether answers of this type can feed a numeric score.
    pub fn is_scorable(&self) -> bool {
        !matches!(self, QuestionType::Textual | QuestionType::NoType)
    }

    /// Builds the validator for a question of this type.
    ///
    /// `bounds` is used by Numeric and Slider questions; Slider falls back to 0-10.
    pub fn validator(&self, choices: Option<&ChoiceSet>, bounds: Bounds) -> Validator {
        match self {
            QuestionType::Binary => Validator::Binary,
            QuestionType::CategoricalBinary | QuestionType::Ordinal | QuestionType::Categorical => {
                Validator::Choices(choices.map(ChoiceSet::keys).unwrap_or_default())
            }
            QuestionType::Numeric => Validator::Numeric(bounds),
            QuestionType::Date => Validator::Date,
            QuestionType::Slider => Validator::Slider(ValueRange::slider(bounds)),
            QuestionType::Textual | QuestionType::NoType => Validator::AcceptAll,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '_'], "");
        match normalized.as_str() {
            "BINARY" => Ok(QuestionType::Binary),
            "CATEGORICALBINARY" => Ok(QuestionType::CategoricalBinary),
            "NUMERIC" => Ok(QuestionType::Numeric),
            "ORDINAL" => Ok(QuestionType::Ordinal),
            "CATEGORICAL" => Ok(QuestionType::Categorical),
            "TEXTUAL" => Ok(QuestionType::Textual),
            "DATE" => Ok(QuestionType::Date),
            "SLIDER" => Ok(QuestionType::Slider),
            "NONE" | "NOTYPE" => Ok(QuestionType::NoType),
            _ => Err(format!("Unknown question type: {s}")),
        }
    }
}

/// Ordered value-to-label choices of a multiple-choice field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    entries: Vec<(i64, String)>,
}

impl ChoiceSet {
    /// Builds a choice set; a repeated key keeps its first label.
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        let mut entries: Vec<(i64, String)> = Vec::new();
        for (key, label) in pairs {
            if entries.iter().all(|(existing, _)| *existing != key) {
                entries.push((key, label));
            }
        }
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(key, label)| (*key, label.as_str()))
    }

    pub fn keys(&self) -> Vec<i64> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }

    pub fn label(&self, key: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, label)| label.as_str())
    }

    /// Smallest and largest key.
    pub fn key_range(&self) -> Option<(i64, i64)> {
        let min = self.entries.iter().map(|(key, _)| *key).min()?;
        let max = self.entries.iter().map(|(key, _)| *key).max()?;
        Some((min, max))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ChoiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, label)) in self.entries.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{key}, {label}")?;
        }
        Ok(())
    }
}

/// Choice payload attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Choices {
    Options(ChoiceSet),
    /// Slider fields keep their anchor description instead of choices.
    SliderLabels(String),
}

impl Choices {
    pub fn options(&self) -> Option<&ChoiceSet> {
        match self {
            Choices::Options(set) => Some(set),
            Choices::SliderLabels(_) => None,
        }
    }
}

/// Closed numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const SLIDER_DEFAULT: ValueRange = ValueRange { min: 0.0, max: 10.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Slider range from declared bounds, each side defaulting to 0-10.
    pub fn slider(bounds: Bounds) -> Self {
        Self {
            min: bounds.min.unwrap_or(Self::SLIDER_DEFAULT.min),
            max: bounds.max.unwrap_or(Self::SLIDER_DEFAULT.max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Catalog entry for one canonical question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub variable_name: String,
    pub text: String,
    pub question_type: QuestionType,
    pub questionnaire: String,
    pub alternate_questionnaire: Option<String>,
    pub is_timestamp: bool,
    pub excluded_from_scoring: bool,
    /// Parent field for indicator questions expanded from a checkbox.
    pub ancestor: Option<String>,
    pub choices: Option<Choices>,
    pub branching_logic: Option<String>,
    pub value_range: Option<ValueRange>,
    #[serde(skip)]
    pub validator: Option<Validator>,
    pub provenance: Option<Provenance>,
}

impl QuestionInfo {
    pub fn new(
        variable_name: impl Into<String>,
        text: impl Into<String>,
        question_type: QuestionType,
        questionnaire: impl Into<String>,
    ) -> Self {
        Self {
            variable_name: variable_name.into(),
            text: text.into(),
            question_type,
            questionnaire: questionnaire.into(),
            alternate_questionnaire: None,
            is_timestamp: false,
            excluded_from_scoring: false,
            ancestor: None,
            choices: None,
            branching_logic: None,
            value_range: None,
            validator: None,
            provenance: None,
        }
    }

    #[must_use]
    pub fn with_alternate_questionnaire(mut self, name: Option<String>) -> Self {
        self.alternate_questionnaire = name;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, is_timestamp: bool) -> Self {
        self.is_timestamp = is_timestamp;
        self
    }

    #[must_use]
    pub fn with_excluded_from_scoring(mut self, excluded: bool) -> Self {
        self.excluded_from_scoring = excluded;
        self
    }

    #[must_use]
    pub fn with_ancestor(mut self, ancestor: Option<String>) -> Self {
        self.ancestor = ancestor;
        self
    }

    #[must_use]
    pub fn with_choices(mut self, choices: Option<Choices>) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub fn with_branching_logic(mut self, logic: Option<String>) -> Self {
        self.branching_logic = logic;
        self
    }

    #[must_use]
    pub fn with_value_range(mut self, range: Option<ValueRange>) -> Self {
        self.value_range = range;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Option<Validator>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: Option<Provenance>) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn choice_set(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref().and_then(Choices::options)
    }

    /// Whether the question can enter a DEFAULT scoring column list.
    pub fn is_default_scorable(&self) -> bool {
        !self.is_timestamp && !self.excluded_from_scoring && self.question_type.is_scorable()
    }
}
