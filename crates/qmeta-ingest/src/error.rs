use std::path::PathBuf;

use polars::prelude::PolarsError;
use qmeta_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load response table {path}: {source}")]
    Polars {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("invalid data in {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub(crate) fn model(path: impl Into<PathBuf>, source: ModelError) -> Self {
        Self::Model {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
