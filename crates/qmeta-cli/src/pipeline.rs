//! Pipeline stages shared by the subcommands.
//!
//! A [`Session`] is one raw-data snapshot: the manifest, its loaded inputs,
//! the mapping and the catalog built from them. Score registries are derived
//! from a session on demand. Nothing is updated in place; a changed input
//! means a new session, identified by a new fingerprint.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::{info, info_span};

use qmeta_catalog::{CatalogBuild, CatalogBuilder, QuestionnaireSummary, summarize_questionnaires};
use qmeta_ingest::{ProjectInputs, ProjectManifest};
use qmeta_map::MappingOutcome;
use qmeta_score::{RegistryBuild, RegistryContext, ScoreRuleSet, build_registry};

/// Parse the manifest and load every input it names.
pub fn load_project(manifest_path: &Path) -> Result<(ProjectManifest, ProjectInputs)> {
    let manifest = ProjectManifest::load(manifest_path)
        .with_context(|| format!("load manifest {}", manifest_path.display()))?;
    let inputs = ProjectInputs::load(&manifest).context("load project inputs")?;
    Ok((manifest, inputs))
}

pub fn reconcile_mapping(inputs: &ProjectInputs) -> Result<MappingOutcome> {
    let outcome = qmeta_map::reconcile(&inputs.rules, &inputs.sources, &inputs.auxiliary)
        .context("reconcile column registries")?;
    Ok(outcome)
}

pub fn build_catalog(
    manifest: &ProjectManifest,
    inputs: &ProjectInputs,
    mapping: &MappingOutcome,
) -> Result<CatalogBuild> {
    let build = CatalogBuilder::new(manifest.catalog)
        .with_aliases(&inputs.auxiliary.aliases)
        .with_exceptional_items(&inputs.exceptional_items)
        .with_mapping(mapping.rows())
        .build(&inputs.dictionary)
        .context("build question catalog")?;
    Ok(build)
}

/// The manifest's rule file, or the bundled rules when it names none.
pub fn load_score_rules(inputs: &ProjectInputs) -> Result<ScoreRuleSet> {
    match &inputs.score_rules {
        Some(path) => ScoreRuleSet::load(path)
            .with_context(|| format!("load score rules {}", path.display())),
        None => ScoreRuleSet::builtin().context("load bundled score rules"),
    }
}

#[derive(Debug)]
pub struct Session {
    pub manifest: ProjectManifest,
    pub inputs: ProjectInputs,
    pub mapping: MappingOutcome,
    pub catalog: CatalogBuild,
}

impl Session {
    /// Run ingest, reconciliation and catalog assembly.
    pub fn open(manifest_path: &Path) -> Result<Self> {
        let (manifest, inputs) = load_project(manifest_path)?;
        let span = info_span!("session", project = %manifest.project.name);
        let _guard = span.enter();
        let mapping = reconcile_mapping(&inputs)?;
        let catalog = build_catalog(&manifest, &inputs, &mapping)?;
        info!(
            rows = mapping.rows().len(),
            questions = catalog.catalog.len(),
            "session ready"
        );
        Ok(Self {
            manifest,
            inputs,
            mapping,
            catalog,
        })
    }

    pub fn fingerprint(&self) -> &str {
        &self.inputs.fingerprint
    }

    pub fn project_name(&self) -> &str {
        &self.manifest.project.name
    }

    pub fn score_registry(&self) -> Result<RegistryBuild> {
        let rules = load_score_rules(&self.inputs)?;
        Ok(build_registry(
            rules.rules(),
            RegistryContext {
                catalog: &self.catalog.catalog,
                roles: &self.inputs.participant_roles,
                renames: &self.manifest.variants,
            },
        ))
    }

    pub fn questionnaire_summaries(&self, registry: &RegistryBuild) -> Vec<QuestionnaireSummary> {
        let scored: BTreeSet<String> = registry
            .registry
            .questionnaires()
            .map(str::to_string)
            .collect();
        summarize_questionnaires(&self.catalog.catalog, &self.inputs.participant_roles, &scored)
    }
}

/// Write a frame to CSV with a header row.
pub fn write_frame_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
