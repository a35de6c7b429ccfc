//! One-shot loading of every table a project manifest names.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{info, info_span};

use qmeta_model::{
    AuxiliaryTables, DictionaryField, ParticipantRoles, RuleTable, SourceRegistries,
};

use crate::dictionary::load_dictionary;
use crate::error::Result;
use crate::fingerprint::fingerprint_inputs;
use crate::manifest::ProjectManifest;
use crate::tables::{
    load_aliases, load_companion_table, load_exceptional_items, load_exclusions,
    load_imputation_table, load_participant_roles, load_rule_table, load_source_registry,
};

/// All inputs of one raw-data snapshot.
#[derive(Debug, Clone)]
pub struct ProjectInputs {
    pub sources: SourceRegistries,
    pub auxiliary: AuxiliaryTables,
    pub rules: RuleTable,
    pub dictionary: Vec<DictionaryField>,
    pub exceptional_items: BTreeSet<String>,
    pub participant_roles: ParticipantRoles,
    pub score_rules: Option<PathBuf>,
    /// Digest of the input files, see [`fingerprint_inputs`].
    pub fingerprint: String,
}

impl ProjectInputs {
    pub fn load(manifest: &ProjectManifest) -> Result<Self> {
        let span = info_span!("ingest", project = %manifest.project.name);
        let _guard = span.enter();
        let inputs = &manifest.inputs;

        let sources = SourceRegistries {
            source_a: load_source_registry(&manifest.resolve(&inputs.source_a))?,
            source_b: load_source_registry(&manifest.resolve(&inputs.source_b))?,
        };
        let auxiliary = AuxiliaryTables {
            companion: load_companion_table(&manifest.resolve(&inputs.companion))?,
            imputation: load_imputation_table(&manifest.resolve(&inputs.imputation))?,
            exclusions: load_exclusions(&manifest.resolve(&inputs.exclusions))?,
            aliases: load_aliases(&manifest.resolve(&inputs.aliases))?,
        };
        let rules = load_rule_table(&manifest.resolve(&inputs.rules))?;
        let dictionary = load_dictionary(&manifest.resolve(&inputs.dictionary))?;
        let exceptional_items =
            load_exceptional_items(&manifest.resolve(&inputs.exceptional_items))?;
        let participant_roles =
            load_participant_roles(&manifest.resolve(&inputs.participant_roles))?;
        let fingerprint = fingerprint_inputs(&manifest.input_files())?;

        let short = fingerprint.get(..12).unwrap_or(&fingerprint);
        info!(
            questionnaires = rules.len(),
            fields = dictionary.len(),
            fingerprint = %short,
            "project inputs loaded"
        );
        Ok(Self {
            sources,
            auxiliary,
            rules,
            dictionary,
            exceptional_items,
            participant_roles,
            score_rules: inputs.score_rules.as_ref().map(|path| manifest.resolve(path)),
            fingerprint,
        })
    }
}
