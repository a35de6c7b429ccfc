use anyhow::{Context, Result, anyhow};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use qmeta_common::column_as_f64;
use qmeta_ingest::load_responses;
use qmeta_map::write_mapping_csv;
use qmeta_score::{BatchScore, score_registry};

use crate::cli::{CatalogArgs, MapArgs, RulesArgs, ScoreArgs};
use crate::types::{CatalogReport, MapReport, RulesReport, ScoreColumnSummary, ScoreReport};
use qmeta_cli::pipeline::{Session, load_project, reconcile_mapping, write_frame_csv};

pub fn run_map(args: &MapArgs) -> Result<MapReport> {
    let (manifest, inputs) = load_project(&args.project.manifest)?;
    let mapping = reconcile_mapping(&inputs)?;
    if let Some(path) = &args.output {
        write_mapping_csv(path, mapping.rows())
            .with_context(|| format!("export mapping to {}", path.display()))?;
        info!(path = %path.display(), rows = mapping.rows().len(), "mapping exported");
    }
    Ok(MapReport {
        project: manifest.project.name.clone(),
        fingerprint: inputs.fingerprint.clone(),
        questionnaires: mapping.summaries(),
        warnings: mapping.warnings().to_vec(),
        exported: args.output.clone(),
    })
}

pub fn run_catalog(args: &CatalogArgs) -> Result<CatalogReport> {
    let session = Session::open(&args.project.manifest)?;
    let catalog = &session.catalog.catalog;

    let questions = match &args.questionnaire {
        Some(name) if !catalog.has_questionnaire(name) => {
            return Err(anyhow!("questionnaire {name} is not in the catalog"));
        }
        Some(name) => Some((name.clone(), catalog.by_questionnaire(name).cloned().collect())),
        None => None,
    };
    let registry = session.score_registry()?;
    Ok(CatalogReport {
        project: session.project_name().to_string(),
        fingerprint: session.fingerprint().to_string(),
        type_counts: catalog.type_counts(),
        questionnaires: session.questionnaire_summaries(&registry),
        questions,
        discrepancies: session.catalog.discrepancies.clone(),
        unmatched_mapping: session.catalog.unmatched_mapping.clone(),
    })
}

pub fn run_rules(args: &RulesArgs) -> Result<RulesReport> {
    let session = Session::open(&args.project.manifest)?;
    let build = session.score_registry()?;
    Ok(RulesReport {
        project: session.project_name().to_string(),
        fingerprint: session.fingerprint().to_string(),
        descriptors: build.registry.iter().cloned().collect(),
        warnings: build.warnings,
        rejected: build.rejected,
    })
}

pub fn run_score(args: &ScoreArgs) -> Result<ScoreReport> {
    let session = Session::open(&args.project.manifest)?;
    let span = info_span!("score_responses", responses = %args.responses.display());
    let _guard = span.enter();

    let build = session.score_registry()?;
    let registry = &build.registry;
    let responses = load_responses(&args.responses)
        .with_context(|| format!("load responses {}", args.responses.display()))?;
    let options = session.manifest.scoring;

    let batch = match &args.questionnaire {
        Some(name) => {
            let info = registry
                .get(name)
                .ok_or_else(|| anyhow!("no score rule for questionnaire {name}"))?;
            score_registry(&responses, [info], &options)
        }
        None => score_registry(&responses, registry.iter(), &options),
    }
    .context("score responses")?;

    let BatchScore {
        mut frame,
        scored,
        skipped,
    } = batch;
    let mut columns = Vec::new();
    for (questionnaire, score_columns) in &scored {
        for column in score_columns {
            columns.push(summarize_score_column(&frame, questionnaire, column)?);
        }
    }
    if let Some(path) = &args.output {
        write_frame_csv(&mut frame, path)?;
        info!(path = %path.display(), "scored table written");
    }
    Ok(ScoreReport {
        project: session.project_name().to_string(),
        responses: args.responses.clone(),
        rows: frame.height(),
        columns,
        skipped,
        output: args.output.clone(),
    })
}

#[allow(clippy::cast_precision_loss)]
fn summarize_score_column(
    frame: &DataFrame,
    questionnaire: &str,
    column: &str,
) -> Result<ScoreColumnSummary> {
    let values = column_as_f64(frame, column)
        .with_context(|| format!("read score column {column}"))?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let mean = (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64);
    Ok(ScoreColumnSummary {
        questionnaire: questionnaire.to_string(),
        column: column.to_string(),
        scored: present.len(),
        missing: values.len() - present.len(),
        mean,
        min: present.iter().copied().reduce(f64::min),
        max: present.iter().copied().reduce(f64::max),
    })
}
