//! Entries the forms dictionaries structurally omit.
//!
//! The companion survey asks the child's age directly, the forms system's
//! event column never appears in its own dictionary, and completion
//! timestamps are export-only columns.

use qmeta_model::{QuestionInfo, QuestionType};

pub const AGE_VARIABLE: &str = "age_child_pre_first";
pub const AGE_QUESTIONNAIRE: &str = "opening_child_pre";
pub const EVENT_VARIABLE: &str = "redcap_event_name";
pub const EVENT_QUESTIONNAIRE: &str = "intro";
pub const TIMESTAMP_SUFFIX: &str = "_timestamp";

pub fn age_question() -> QuestionInfo {
    QuestionInfo::new(AGE_VARIABLE, "גיל", QuestionType::Numeric, AGE_QUESTIONNAIRE)
}

pub fn event_question() -> QuestionInfo {
    QuestionInfo::new(
        EVENT_VARIABLE,
        EVENT_VARIABLE,
        QuestionType::Categorical,
        EVENT_QUESTIONNAIRE,
    )
}

pub fn timestamp_question(name: &str, questionnaire: &str) -> QuestionInfo {
    QuestionInfo::new(name, "timestamp", QuestionType::Date, questionnaire).with_timestamp(true)
}

/// Whether a variable name denotes a timestamp or date column.
pub fn is_timestamp_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("timestamp") || lower.contains("date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_names() {
        assert!(is_timestamp_name("sdq_timestamp"));
        assert!(is_timestamp_name("Visit_Date"));
        assert!(!is_timestamp_name("sdq_1"));
    }

    #[test]
    fn placeholders_are_dates() {
        let question = timestamp_question("sdq_timestamp", "sdq");
        assert!(question.is_timestamp);
        assert_eq!(question.question_type, QuestionType::Date);
        assert!(!question.is_default_scorable());
    }
}
