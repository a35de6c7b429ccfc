use std::path::PathBuf;

use polars::prelude::PolarsError;
use qmeta_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("{questionnaire}: column '{column}' is missing from the response table")]
    MissingColumn {
        questionnaire: String,
        column: String,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("failed to read score rules {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse score rules {origin}: {source}")]
    Rules {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("questionnaire {questionnaire} has more than one score rule in {origin}")]
    DuplicateRule {
        origin: String,
        questionnaire: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
