//! Shared utilities for the questionnaire metadata workspace.
//!
//! Polars value helpers used by ingestion and scoring, and the name-token
//! helpers shared by the classifier and the participant-variant expander.

pub mod names;
pub mod polars;

pub use names::{name_tokens, replace_trailing_segment};
pub use polars::{any_to_f64, column_as_f64, is_missing_marker, parse_f64};
