//! Snapshot fingerprint over the project inputs.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::{IngestError, Result};

/// SHA-256 hex digest over every `(role, file contents)` pair, in order.
///
/// Two snapshots with the same fingerprint produce the same catalog and registry.
pub fn fingerprint_inputs(files: &[(&str, PathBuf)]) -> Result<String> {
    let mut hasher = Sha256::new();
    for (role, path) in files {
        let bytes = std::fs::read(path).map_err(|error| IngestError::io(path, error))?;
        hasher.update(role.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(hex::encode(hasher.finalize()))
}
