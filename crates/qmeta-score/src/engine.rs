//! Questionnaire scoring over response tables.
//!
//! # Algorithm
//!
//! 1. Methods the engine cannot aggregate return [`ScoreOutcome::NotComputable`].
//! 2. Reverse-coded items are transformed with `max + min - value`.
//! 3. The main score aggregates the scored columns row by row.
//! 4. Rows whose share of missing inputs exceeds the threshold get no score.
//! 5. Each cluster repeats steps 3 and 4 over its own columns.
//!
//! Reversal happens on working copies of the item values, so the item
//! columns of the returned frame are identical to the input.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, info, info_span, warn};

use qmeta_common::column_as_f64;
use qmeta_model::{AggregationMethod, ModelError, ScoringInfo, ScoringOptions};

use crate::error::{Result, ScoreError};
use crate::registry::ScoreRegistry;

/// Frame with the score columns appended.
#[derive(Debug, Clone)]
pub struct ScoredFrame {
    pub frame: DataFrame,
    /// `[main score] + cluster names`.
    pub score_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum ScoreOutcome {
    Scored(ScoredFrame),
    /// No score is available for this questionnaire. Not a failure.
    NotComputable { questionnaire: String, reason: String },
}

/// `max + min - value`; applying it twice returns `value`.
pub fn reverse_value(value: f64, min: f64, max: f64) -> f64 {
    max + min - value
}

/// Share of missing entries, `0.0` for an empty row.
#[allow(clippy::cast_precision_loss)]
pub fn missing_ratio(values: &[Option<f64>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let missing = values.iter().filter(|value| value.is_none()).count();
    missing as f64 / values.len() as f64
}

/// Row-wise aggregate ignoring missing values.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(method: AggregationMethod, values: &[Option<f64>]) -> Option<f64> {
    let present = values.iter().flatten();
    match method {
        AggregationMethod::Sum => Some(present.sum()),
        AggregationMethod::Average => {
            let (total, count) = present.fold((0.0, 0usize), |(total, count), value| {
                (total + value, count + 1)
            });
            (count > 0).then(|| total / count as f64)
        }
        AggregationMethod::SingleItem => values.first().copied().flatten(),
        AggregationMethod::NoScoringNeeded
        | AggregationMethod::MissingImplementation
        | AggregationMethod::Bespoke(_) => None,
    }
}

/// Item values keyed by column, reversed where the descriptor says so.
struct ItemTable {
    height: usize,
    items: BTreeMap<String, Vec<Option<f64>>>,
}

impl ItemTable {
    fn load(frame: &DataFrame, info: &ScoringInfo) -> Result<Self> {
        let mut items = BTreeMap::new();
        let needed = info
            .columns()
            .iter()
            .chain(info.clusters().iter().flat_map(|cluster| cluster.columns.iter()));
        for column in needed {
            if items.contains_key(column) {
                continue;
            }
            if frame.column(column).is_err() {
                return Err(ScoreError::MissingColumn {
                    questionnaire: info.questionnaire().to_string(),
                    column: column.clone(),
                });
            }
            items.insert(column.clone(), column_as_f64(frame, column)?);
        }
        let mut table = Self {
            height: frame.height(),
            items,
        };
        table.reverse(info)?;
        Ok(table)
    }

    fn reverse(&mut self, info: &ScoringInfo) -> Result<()> {
        if info.reversed_columns().is_empty() {
            return Ok(());
        }
        let Some((min, max)) = info.range() else {
            return Err(ModelError::MissingScoreRange {
                questionnaire: info.questionnaire().to_string(),
                count: info.reversed_columns().len(),
            }
            .into());
        };
        for column in info.reversed_columns() {
            if let Some(values) = self.items.get_mut(column) {
                for value in values.iter_mut().flatten() {
                    *value = reverse_value(*value, min, max);
                }
            }
        }
        Ok(())
    }

    /// Aggregates `columns` per row, suppressing sparse rows.
    fn score(
        &self,
        columns: &[String],
        method: AggregationMethod,
        threshold: f64,
    ) -> Vec<Option<f64>> {
        let series: Vec<&Vec<Option<f64>>> = columns
            .iter()
            .filter_map(|column| self.items.get(column))
            .collect();
        let mut row = Vec::with_capacity(series.len());
        (0..self.height)
            .map(|idx| {
                row.clear();
                row.extend(series.iter().map(|values| values[idx]));
                if missing_ratio(&row) > threshold {
                    None
                } else {
                    aggregate(method, &row)
                }
            })
            .collect()
    }
}

/// Scores one questionnaire, returning a new frame with the score columns.
///
/// # Errors
///
/// Returns [`ScoreError::MissingColumn`] when a scored or cluster column is
/// absent from `frame`.
pub fn score(
    frame: &DataFrame,
    info: &ScoringInfo,
    options: &ScoringOptions,
) -> Result<ScoreOutcome> {
    let span = info_span!("score", questionnaire = %info.questionnaire());
    let _guard = span.enter();

    let method = info.method();
    if !method.is_computable() {
        debug!(%method, "method is not computable");
        return Ok(ScoreOutcome::NotComputable {
            questionnaire: info.questionnaire().to_string(),
            reason: method.as_str().to_string(),
        });
    }
    if info.columns().is_empty() {
        return Ok(ScoreOutcome::NotComputable {
            questionnaire: info.questionnaire().to_string(),
            reason: "no scored columns".to_string(),
        });
    }

    let items = ItemTable::load(frame, info)?;
    let threshold = options.missing_threshold;
    let mut scored = frame.clone();
    let mut score_columns = Vec::with_capacity(1 + info.clusters().len());

    let main = info.score_column_name();
    let values = items.score(info.columns(), method, threshold);
    scored.with_column(Series::new(main.as_str().into(), values).into_column())?;
    score_columns.push(main);

    for cluster in info.clusters() {
        let values = items.score(&cluster.columns, method, threshold);
        scored.with_column(Series::new(cluster.name.as_str().into(), values).into_column())?;
        score_columns.push(cluster.name.clone());
    }

    debug!(columns = score_columns.len(), rows = scored.height(), "questionnaire scored");
    Ok(ScoreOutcome::Scored(ScoredFrame {
        frame: scored,
        score_columns,
    }))
}

/// Result of scoring several questionnaires into one frame.
#[derive(Debug, Clone)]
pub struct BatchScore {
    pub frame: DataFrame,
    /// Questionnaire and the score columns it produced.
    pub scored: Vec<(String, Vec<String>)>,
    /// Questionnaire and why no score was produced.
    pub skipped: Vec<(String, String)>,
}

/// Scores every registry descriptor the frame can support.
///
/// Missing response columns skip that questionnaire instead of failing.
///
/// # Errors
///
/// Propagates polars failures while appending score columns.
pub fn score_registry<'a, I>(
    frame: &DataFrame,
    infos: I,
    options: &ScoringOptions,
) -> Result<BatchScore>
where
    I: IntoIterator<Item = &'a ScoringInfo>,
{
    let mut batch = BatchScore {
        frame: frame.clone(),
        scored: Vec::new(),
        skipped: Vec::new(),
    };
    for info in infos {
        match score(&batch.frame, info, options) {
            Ok(ScoreOutcome::Scored(result)) => {
                batch.frame = result.frame;
                batch
                    .scored
                    .push((info.questionnaire().to_string(), result.score_columns));
            }
            Ok(ScoreOutcome::NotComputable {
                questionnaire,
                reason,
            }) => batch.skipped.push((questionnaire, reason)),
            Err(ScoreError::MissingColumn { column, .. }) => {
                warn!(questionnaire = %info.questionnaire(), %column, "response column missing, questionnaire skipped");
                batch.skipped.push((
                    info.questionnaire().to_string(),
                    format!("missing column {column}"),
                ));
            }
            Err(error) => return Err(error),
        }
    }
    info!(
        scored = batch.scored.len(),
        skipped = batch.skipped.len(),
        "responses scored"
    );
    Ok(batch)
}

/// Convenience over [`score_registry`] for a whole registry.
///
/// # Errors
///
/// See [`score_registry`].
pub fn score_all(
    frame: &DataFrame,
    registry: &ScoreRegistry,
    options: &ScoringOptions,
) -> Result<BatchScore> {
    score_registry(frame, registry.iter(), options)
}
