use std::path::PathBuf;

use qmeta_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to write mapping {path}: {message}")]
    Export { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, MapError>;
