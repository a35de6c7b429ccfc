//! Loaders for the external inputs: registries, lookup tables, the field
//! dictionary, the project manifest and response tables.

pub mod csv_utils;
pub mod dictionary;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod project;
pub mod responses;
pub mod tables;

pub use dictionary::load_dictionary;
pub use error::{IngestError, Result};
pub use fingerprint::fingerprint_inputs;
pub use manifest::{InputPaths, ProjectHeader, ProjectManifest};
pub use project::ProjectInputs;
pub use responses::load_responses;
pub use tables::{
    load_aliases, load_companion_table, load_exceptional_items, load_exclusions,
    load_imputation_table, load_participant_roles, load_rule_table, load_source_registry,
};
