//! Question catalog assembly.
//!
//! Classifies field dictionary rows into typed questions, expands multi-select
//! fields into indicator questions and reconciles the result against the
//! column mapping.

pub mod builder;
pub mod catalog;
pub mod choices;
pub mod classify;
pub mod error;
pub mod questionnaire;
pub mod synthetic;

pub use builder::{CatalogBuild, CatalogBuilder};
pub use catalog::QuestionCatalog;
pub use choices::parse_choices;
pub use classify::{Classification, classify, is_identifier_like};
pub use error::{CatalogError, Result};
pub use questionnaire::{
    Discrepancy, QuestionnaireSummary, find_discrepancies, summarize_questionnaires,
};
pub use synthetic::{
    AGE_QUESTIONNAIRE, AGE_VARIABLE, EVENT_QUESTIONNAIRE, EVENT_VARIABLE, TIMESTAMP_SUFFIX,
    age_question, event_question, is_timestamp_name, timestamp_question,
};
