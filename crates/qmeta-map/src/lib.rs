//! Schema reconciliation across the questionnaire capture systems.

pub mod engine;
pub mod error;
pub mod export;
pub mod outcome;

pub use engine::{MappingEngine, reconcile};
pub use error::{MapError, Result};
pub use export::{write_mapping, write_mapping_csv};
pub use outcome::{MappingOutcome, QuestionnaireMapping};
