//! Data model for questionnaire metadata reconciliation, cataloguing and scoring.

pub mod dictionary;
pub mod error;
pub mod lookup;
pub mod mapping;
pub mod options;
pub mod participant;
pub mod question;
pub mod scoring;
pub mod sources;
pub mod validator;

pub use dictionary::{DictionaryField, FieldKind};
pub use error::{ModelError, Result};
pub use lookup::CaseInsensitiveIndex;
pub use mapping::{
    ColumnMappingRow, MappingWarning, Provenance, SourceSystem, SystemNames, TransformationRule,
};
pub use options::{CatalogOptions, ScoringOptions, SuffixRule, VariantRenameRules};
pub use participant::{ParticipantRole, ParticipantRoles};
pub use question::{ChoiceSet, Choices, QuestionInfo, QuestionType, ValueRange};
pub use scoring::{
    AggregationMethod, BespokeMethod, Cluster, ColumnSpec, DEFAULT_COLUMNS, ScoreRule,
    ScoringInfo, ScoringWarning,
};
pub use sources::{
    AuxiliaryTables, CompanionEntry, CompanionTable, ExclusionList, ImputationTable,
    QuestionnaireAliases, RuleTable, SourceRegistries, SourceRegistry,
};
pub use validator::{Bounds, ValueIssue, Validator};
