use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown transformation rule '{rule}' for questionnaire {questionnaire}")]
    UnknownRule { questionnaire: String, rule: String },
    #[error("questionnaire {questionnaire} has conflicting rules {first} and {second}")]
    ConflictingRule {
        questionnaire: String,
        first: String,
        second: String,
    },
    #[error("unknown aggregation method '{0}'")]
    UnknownAggregation(String),
    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),
    #[error("questionnaire {questionnaire} reverse-codes {count} column(s) without min/max values")]
    MissingScoreRange { questionnaire: String, count: usize },
    #[error("questionnaire {questionnaire} has min value {min} above max value {max}")]
    InvalidScoreRange {
        questionnaire: String,
        min: f64,
        max: f64,
    },
    #[error("scoring columns for {questionnaire} still use the DEFAULT sentinel")]
    UnresolvedColumns { questionnaire: String },
    #[error("mapping row {canonical_name} in {questionnaire} names no source system")]
    EmptyMappingRow {
        questionnaire: String,
        canonical_name: String,
    },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
