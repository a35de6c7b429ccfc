//! Mapping engine implementation.
//!
//! Every questionnaire in the rule table is handled by exactly one handler,
//! chosen by an exhaustive match on its [`TransformationRule`]:
//!
//! - **Driven** handlers iterate one forms system's column list (the driver)
//!   and only ever *attach* names from the other systems. A name listed
//!   verbatim by both forms systems therefore produces one row, owned by the
//!   driver.
//! - The **companion-only** handler walks the companion rename table and
//!   emits rows for companion columns with no canonical counterpart.
//!
//! Companion entries that no handler consumed are reported as warnings.

use std::collections::BTreeSet;

use tracing::{debug, info, info_span, warn};

use qmeta_model::{
    AuxiliaryTables, ColumnMappingRow, CompanionEntry, MappingWarning, RuleTable, SourceRegistries,
    SourceRegistry, SourceSystem, SystemNames, TransformationRule,
};

use crate::error::Result;
use crate::outcome::MappingOutcome;

/// Reconciles the forms registries and the companion table into canonical rows.
#[derive(Debug, Clone, Copy)]
pub struct MappingEngine<'a> {
    sources: &'a SourceRegistries,
    tables: &'a AuxiliaryTables,
}

/// Which forms system drives a handler, and whether the other one is attached.
#[derive(Debug, Clone, Copy)]
struct Driver {
    system: SourceSystem,
    attach_other: bool,
}

impl<'a> MappingEngine<'a> {
    #[must_use]
    pub fn new(sources: &'a SourceRegistries, tables: &'a AuxiliaryTables) -> Self {
        Self { sources, tables }
    }

    /// Builds mapping rows for every questionnaire in `rules`, in rule-table order.
    ///
    /// # Errors
    ///
    /// Fails only when a row would name no system at all, which the handlers
    /// never construct from well-formed tables.
    pub fn reconcile(&self, rules: &RuleTable) -> Result<MappingOutcome> {
        let span = info_span!("reconcile", questionnaires = rules.len());
        let _guard = span.enter();

        let mut state = ReconcileState::default();
        for (questionnaire, rule) in rules.iter() {
            let before = state.rows.len();
            match rule {
                TransformationRule::Default | TransformationRule::ExtraInSourceA => {
                    self.driven(&mut state, questionnaire, Driver::source_a(true))?;
                    self.companion_only(&mut state, questionnaire)?;
                }
                TransformationRule::SourceAOnly => {
                    self.driven(&mut state, questionnaire, Driver::source_a(false))?;
                    self.companion_only(&mut state, questionnaire)?;
                }
                TransformationRule::ExtraInSourceB => {
                    self.driven(&mut state, questionnaire, Driver::source_b())?;
                }
                TransformationRule::CompanionOnly => {
                    self.companion_only(&mut state, questionnaire)?;
                }
            }
            debug!(
                questionnaire,
                rule = %rule,
                rows = state.rows.len() - before,
                "questionnaire reconciled"
            );
        }

        self.report_unconsumed(&mut state);
        for warning in &state.warnings {
            warn!(questionnaire = warning.questionnaire(), "{warning}");
        }
        info!(
            rows = state.rows.len(),
            warnings = state.warnings.len(),
            "reconciliation complete"
        );
        Ok(MappingOutcome::new(state.rows, state.warnings))
    }

    fn registry(&self, system: SourceSystem) -> &'a SourceRegistry {
        match system {
            SourceSystem::SourceB => &self.sources.source_b,
            SourceSystem::SourceA | SourceSystem::Companion => &self.sources.source_a,
        }
    }

    fn driven(&self, state: &mut ReconcileState, questionnaire: &str, driver: Driver) -> Result<()> {
        let Some(columns) = self.registry(driver.system).columns(questionnaire) else {
            state.warnings.push(MappingWarning::MissingDriverList {
                questionnaire: questionnaire.to_string(),
                system: driver.system,
            });
            return Ok(());
        };
        let other = driver.other();
        let display = self.tables.aliases.canonical_name(questionnaire);

        for column in columns {
            if self.tables.exclusions.contains(column) {
                continue;
            }
            let attached = (driver.attach_other
                && self.registry(other).lists(questionnaire, column))
            .then(|| column.clone());
            let companion = self.tables.companion.find(display, column);

            let mut names = SystemNames::default();
            match driver.system {
                SourceSystem::SourceB => {
                    names.source_b = Some(column.clone());
                    names.source_a = attached;
                }
                SourceSystem::SourceA | SourceSystem::Companion => {
                    names.source_a = Some(column.clone());
                    names.source_b = attached;
                }
            }
            names.companion = companion.map(|(_, entry)| entry.companion_name.clone());

            let row = self.build_row(questionnaire, display, column, names, companion.map(|(_, e)| e))?;
            if state.push(row)
                && let Some((idx, _)) = companion
            {
                state.consumed.insert(idx);
            }
        }
        Ok(())
    }

    fn companion_only(&self, state: &mut ReconcileState, questionnaire: &str) -> Result<()> {
        let display = self.tables.aliases.canonical_name(questionnaire);
        for (idx, entry) in self.tables.companion.for_questionnaire(display) {
            if entry.canonical_name.is_some() || self.tables.exclusions.contains(&entry.companion_name) {
                continue;
            }
            let names = SystemNames {
                companion: Some(entry.companion_name.clone()),
                ..SystemNames::default()
            };
            let row = self.build_row(questionnaire, display, &entry.companion_name, names, Some(entry))?;
            state.consumed.insert(idx);
            if !state.push(row) {
                state.warnings.push(MappingWarning::DuplicateCanonical {
                    questionnaire: questionnaire.to_string(),
                    canonical_name: entry.companion_name.clone(),
                });
            }
        }
        Ok(())
    }

    fn build_row(
        &self,
        questionnaire: &str,
        display: &str,
        canonical_name: &str,
        names: SystemNames,
        companion: Option<&CompanionEntry>,
    ) -> Result<ColumnMappingRow> {
        let row = ColumnMappingRow::new(questionnaire, display, canonical_name, names)?
            .with_imputation_source(
                self.tables
                    .imputation
                    .original_for(canonical_name)
                    .map(str::to_string),
            );
        Ok(match companion {
            Some(entry) => row.with_companion_details(
                entry.match_type.clone(),
                entry.original_companion_name.clone(),
            ),
            None => row,
        })
    }

    fn report_unconsumed(&self, state: &mut ReconcileState) {
        for (idx, entry) in self.tables.companion.entries().iter().enumerate() {
            if state.consumed.contains(&idx) || self.tables.exclusions.contains(&entry.companion_name)
            {
                continue;
            }
            state.warnings.push(MappingWarning::UnconsumedCompanion {
                questionnaire: entry.questionnaire.clone(),
                canonical_name: entry.canonical_name.clone(),
                companion_name: entry.companion_name.clone(),
            });
        }
    }
}

impl Driver {
    fn source_a(attach_other: bool) -> Self {
        Self {
            system: SourceSystem::SourceA,
            attach_other,
        }
    }

    fn source_b() -> Self {
        Self {
            system: SourceSystem::SourceB,
            attach_other: true,
        }
    }

    fn other(self) -> SourceSystem {
        match self.system {
            SourceSystem::SourceB => SourceSystem::SourceA,
            SourceSystem::SourceA | SourceSystem::Companion => SourceSystem::SourceB,
        }
    }
}

#[derive(Debug, Default)]
struct ReconcileState {
    rows: Vec<ColumnMappingRow>,
    warnings: Vec<MappingWarning>,
    /// `(questionnaire, canonical name)` pairs already emitted.
    seen: BTreeSet<(String, String)>,
    /// Companion table positions attached to a row or reported as duplicates.
    consumed: BTreeSet<usize>,
}

impl ReconcileState {
    /// Appends `row` unless its key was already emitted.
    fn push(&mut self, row: ColumnMappingRow) -> bool {
        let key = (row.questionnaire.clone(), row.canonical_name.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.rows.push(row);
        true
    }
}

/// Convenience wrapper around [`MappingEngine::reconcile`].
pub fn reconcile(
    rules: &RuleTable,
    sources: &SourceRegistries,
    tables: &AuxiliaryTables,
) -> Result<MappingOutcome> {
    MappingEngine::new(sources, tables).reconcile(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmeta_model::{CompanionTable, ExclusionList, Provenance};

    fn registries() -> SourceRegistries {
        let mut sources = SourceRegistries::default();
        sources.source_a.insert_joined("sdq", "sdq_1,sdq_2,sdq_complete");
        sources.source_b.insert_joined("sdq", "sdq_1,sdq_3");
        sources
    }

    #[test]
    fn driver_owns_shared_columns() {
        let sources = registries();
        let tables = AuxiliaryTables {
            exclusions: ExclusionList::new(["sdq_complete"]),
            ..AuxiliaryTables::default()
        };
        let rules = RuleTable::from_raw(vec![("sdq".to_string(), "DEFAULT".to_string())]).unwrap();
        let outcome = reconcile(&rules, &sources, &tables).unwrap();

        let names: Vec<_> = outcome.rows().iter().map(|r| r.canonical_name.as_str()).collect();
        assert_eq!(names, ["sdq_1", "sdq_2"]);
        assert_eq!(outcome.rows()[0].source_b_name.as_deref(), Some("sdq_1"));
        assert_eq!(outcome.rows()[1].source_b_name, None);
        assert!(outcome.rows().iter().all(|r| r.provenance == Provenance::Forms));
    }

    #[test]
    fn source_a_only_never_attaches_b() {
        let sources = registries();
        let tables = AuxiliaryTables::default();
        let rules =
            RuleTable::from_raw(vec![("sdq".to_string(), "SOURCE_A_ONLY".to_string())]).unwrap();
        let outcome = reconcile(&rules, &sources, &tables).unwrap();
        assert!(outcome.rows().iter().all(|r| r.source_b_name.is_none()));
        assert_eq!(outcome.rows().len(), 3);
    }

    #[test]
    fn missing_driver_list_is_a_warning() {
        let sources = registries();
        let tables = AuxiliaryTables {
            companion: CompanionTable::default(),
            ..AuxiliaryTables::default()
        };
        let rules =
            RuleTable::from_raw(vec![("mfq".to_string(), "EXTRA_IN_SOURCE_B".to_string())]).unwrap();
        let outcome = reconcile(&rules, &sources, &tables).unwrap();
        assert!(outcome.rows().is_empty());
        assert_eq!(
            outcome.warnings(),
            [MappingWarning::MissingDriverList {
                questionnaire: "mfq".to_string(),
                system: SourceSystem::SourceB,
            }]
        );
    }
}
