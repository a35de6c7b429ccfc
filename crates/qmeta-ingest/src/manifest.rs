//! Project manifest (`qmeta.toml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qmeta_model::{CatalogOptions, ScoringOptions, VariantRenameRules};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub project: ProjectHeader,
    pub inputs: InputPaths,
    #[serde(default)]
    pub scoring: ScoringOptions,
    #[serde(default)]
    pub catalog: CatalogOptions,
    /// Participant-variant renaming for score rules.
    #[serde(default)]
    pub variants: VariantRenameRules,
    #[serde(skip)]
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectHeader {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input file paths, relative to the manifest directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    pub source_a: PathBuf,
    pub source_b: PathBuf,
    pub companion: PathBuf,
    pub imputation: PathBuf,
    pub exclusions: PathBuf,
    pub aliases: PathBuf,
    pub rules: PathBuf,
    pub dictionary: PathBuf,
    pub exceptional_items: PathBuf,
    pub participant_roles: PathBuf,
    /// Curated score rules; the bundled registry is used when absent.
    #[serde(default)]
    pub score_rules: Option<PathBuf>,
}

impl ProjectManifest {
    /// Parse and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|error| IngestError::io(path, error))?;
        let mut manifest: ProjectManifest =
            toml::from_str(&text).map_err(|source| IngestError::Toml {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.scoring.missing_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(IngestError::InvalidManifest {
                message: format!("missing_threshold must be within [0, 1], got {threshold}"),
            });
        }
        if let Some(rule) = self
            .variants
            .rules
            .iter()
            .find(|rule| rule.from.trim().is_empty() || rule.to.trim().is_empty())
        {
            return Err(IngestError::InvalidManifest {
                message: format!(
                    "variant rename rule has an empty segment: {:?} -> {:?}",
                    rule.from, rule.to
                ),
            });
        }
        if self.project.name.trim().is_empty() {
            return Err(IngestError::InvalidManifest {
                message: "project name is empty".to_string(),
            });
        }
        for (role, path) in self.input_files() {
            if !path.is_file() {
                return Err(IngestError::InvalidManifest {
                    message: format!("{role} input not found: {}", path.display()),
                });
            }
        }
        Ok(())
    }

    /// Directory the input paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root.join(relative)
        }
    }

    /// Every declared input as `(role, absolute path)`, in a fixed order.
    pub fn input_files(&self) -> Vec<(&'static str, PathBuf)> {
        let inputs = &self.inputs;
        let mut files = vec![
            ("source_a", self.resolve(&inputs.source_a)),
            ("source_b", self.resolve(&inputs.source_b)),
            ("companion", self.resolve(&inputs.companion)),
            ("imputation", self.resolve(&inputs.imputation)),
            ("exclusions", self.resolve(&inputs.exclusions)),
            ("aliases", self.resolve(&inputs.aliases)),
            ("rules", self.resolve(&inputs.rules)),
            ("dictionary", self.resolve(&inputs.dictionary)),
            ("exceptional_items", self.resolve(&inputs.exceptional_items)),
            ("participant_roles", self.resolve(&inputs.participant_roles)),
        ];
        if let Some(score_rules) = &inputs.score_rules {
            files.push(("score_rules", self.resolve(score_rules)));
        }
        files
    }
}
