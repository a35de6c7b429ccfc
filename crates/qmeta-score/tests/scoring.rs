//! Scoring engine behaviour on small response tables.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use qmeta_common::column_as_f64;
use qmeta_model::{
    AggregationMethod, Cluster, ColumnSpec, ScoreRule, ScoringInfo, ScoringOptions,
};
use qmeta_score::{BatchScore, ScoreOutcome, ScoreRegistry, reverse_value, score, score_all};

fn frame(columns: Vec<(String, Vec<Option<f64>>)>) -> DataFrame {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    DataFrame::new(columns).unwrap()
}

fn names(prefix: &str, range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|idx| format!("{prefix}_{idx}")).collect()
}

fn scored(outcome: ScoreOutcome) -> qmeta_score::ScoredFrame {
    match outcome {
        ScoreOutcome::Scored(result) => result,
        ScoreOutcome::NotComputable { reason, .. } => panic!("not computable: {reason}"),
    }
}

#[test]
fn sparse_rows_lose_their_sum() {
    let columns = names("mfq", 1..=4);
    // Row 0: three of four missing. Row 1: one missing.
    let data = vec![
        (columns[0].clone(), vec![Some(1.0), Some(1.0)]),
        (columns[1].clone(), vec![None, Some(2.0)]),
        (columns[2].clone(), vec![None, None]),
        (columns[3].clone(), vec![None, Some(3.0)]),
    ];
    let info = ScoringInfo::try_from_rule(ScoreRule::new(
        "mfq",
        AggregationMethod::Sum,
        ColumnSpec::Listed(columns),
    ))
    .unwrap();
    let options = ScoringOptions::default().with_missing_threshold(0.5);
    let result = scored(score(&frame(data), &info, &options).unwrap());
    assert_eq!(result.score_columns, ["mfq_score"]);
    assert_eq!(
        column_as_f64(&result.frame, "mfq_score").unwrap(),
        [None, Some(6.0)]
    );
}

#[test]
fn half_missing_is_still_scored() {
    let columns = names("sas", 1..=2);
    let data = vec![
        (columns[0].clone(), vec![Some(3.0)]),
        (columns[1].clone(), vec![None]),
    ];
    let info = ScoringInfo::try_from_rule(ScoreRule::new(
        "sas",
        AggregationMethod::Average,
        ColumnSpec::Listed(columns),
    ))
    .unwrap();
    let result = scored(score(&frame(data), &info, &ScoringOptions::default()).unwrap());
    assert_eq!(column_as_f64(&result.frame, "sas_score").unwrap(), [Some(3.0)]);
}

#[test]
fn clusters_are_thresholded_independently() {
    let first = names("wai", 1..=5);
    let second = names("wai", 6..=11);
    let all: Vec<String> = first.iter().chain(&second).cloned().collect();

    // Row 0: first cluster fully answered, second cluster 4 of 6 missing.
    let data = all
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let answered = idx < 5 || idx >= 9;
            (name.clone(), vec![answered.then_some(1.0)])
        })
        .collect();

    let info = ScoringInfo::try_from_rule(
        ScoreRule::new("wai", AggregationMethod::Sum, ColumnSpec::Listed(all))
            .with_cluster(Cluster::new("wai_goal", first))
            .with_cluster(Cluster::new("wai_bond", second)),
    )
    .unwrap();
    let result = scored(score(&frame(data), &info, &ScoringOptions::default()).unwrap());

    assert_eq!(result.score_columns, ["wai_score", "wai_goal", "wai_bond"]);
    // 4 of 11 missing overall stays under the threshold.
    assert_eq!(column_as_f64(&result.frame, "wai_score").unwrap(), [Some(7.0)]);
    assert_eq!(column_as_f64(&result.frame, "wai_goal").unwrap(), [Some(5.0)]);
    assert_eq!(column_as_f64(&result.frame, "wai_bond").unwrap(), [None]);
}

#[test]
fn single_item_passes_through() {
    let info = ScoringInfo::try_from_rule(ScoreRule::new(
        "cgi_s_clin",
        AggregationMethod::SingleItem,
        ColumnSpec::Listed(vec!["cgi_s_clin_1".to_string()]),
    ))
    .unwrap();
    let data = vec![("cgi_s_clin_1".to_string(), vec![Some(4.0), None])];
    let result = scored(score(&frame(data), &info, &ScoringOptions::default()).unwrap());
    assert_eq!(
        column_as_f64(&result.frame, "cgi_s_clin_score").unwrap(),
        [Some(4.0), None]
    );
}

#[test]
fn batch_scoring_skips_what_it_cannot_score() {
    let infos = vec![
        ScoringInfo::try_from_rule(ScoreRule::new(
            "mfq",
            AggregationMethod::Sum,
            ColumnSpec::Listed(names("mfq", 1..=2)),
        ))
        .unwrap(),
        ScoringInfo::try_from_rule(ScoreRule::new(
            "siq",
            AggregationMethod::Sum,
            ColumnSpec::Listed(names("siq", 1..=2)),
        ))
        .unwrap(),
        ScoringInfo::try_from_rule(ScoreRule::new(
            "moas_m",
            AggregationMethod::NoScoringNeeded,
            ColumnSpec::default(),
        ))
        .unwrap(),
    ];
    let registry = ScoreRegistry::from_infos(infos);
    let data = vec![
        ("mfq_1".to_string(), vec![Some(1.0)]),
        ("mfq_2".to_string(), vec![Some(2.0)]),
    ];
    let BatchScore {
        frame: result,
        scored,
        skipped,
    } = score_all(&frame(data), &registry, &ScoringOptions::default()).unwrap();

    assert_eq!(scored, [("mfq".to_string(), vec!["mfq_score".to_string()])]);
    assert_eq!(column_as_f64(&result, "mfq_score").unwrap(), [Some(3.0)]);
    insta::assert_debug_snapshot!(skipped, @r#"
    [
        (
            "siq",
            "missing column siq_1",
        ),
        (
            "moas_m",
            "no_scoring_needed",
        ),
    ]
    "#);
}

proptest! {
    #[test]
    fn reversing_twice_is_identity(
        min in -10i32..10,
        span in 0i32..10,
        offset in 0i32..10,
    ) {
        let min = f64::from(min);
        let max = min + f64::from(span);
        let value = min + f64::from(offset.min(span));
        prop_assert_eq!(reverse_value(reverse_value(value, min, max), min, max), value);
    }

    #[test]
    fn scoring_never_changes_item_columns(
        values in proptest::collection::vec(proptest::option::of(0i32..=4), 1..20),
    ) {
        let items: Vec<Option<f64>> = values.iter().map(|value| value.map(f64::from)).collect();
        let input = frame(vec![
            ("ders_1".to_string(), items.clone()),
            ("ders_2".to_string(), items.iter().rev().copied().collect()),
        ]);
        let info = ScoringInfo::try_from_rule(
            ScoreRule::new("ders", AggregationMethod::Sum, ColumnSpec::Listed(names("ders", 1..=2)))
                .with_reversed(["ders_1"])
                .with_range(0.0, 4.0),
        )
        .unwrap();
        let result = scored(score(&input, &info, &ScoringOptions::default()).unwrap());
        prop_assert_eq!(column_as_f64(&result.frame, "ders_1").unwrap(), items);
    }
}
