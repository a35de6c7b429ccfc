use std::fs;
use std::path::{Path, PathBuf};

use qmeta_catalog::{AGE_VARIABLE, EVENT_VARIABLE};
use qmeta_cli::pipeline::{Session, write_frame_csv};
use qmeta_common::column_as_f64;
use qmeta_ingest::load_responses;
use qmeta_model::{Provenance, QuestionType};
use qmeta_score::score_all;

fn temp_dir(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("qmeta_cli_{tag}_{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const SDQ_CHOICES: &str = "\"0, 0 Not true | 1, 1 Somewhat true | 2, 2 Certainly true\"";

fn write_project(dir: &Path) -> PathBuf {
    write(
        dir,
        "a.csv",
        "questionnaire_name,column_names\nsdq,\"sdq_1,sdq_2,sdq_3,sdq_timestamp,sdq_9\"\n",
    );
    write(dir, "b.csv", "questionnaire_name,column_names\nsdq,\"sdq_1,sdq_2\"\n");
    write(
        dir,
        "companion.csv",
        "questionnaire,canonical_name,companion_name,match_type,original_companion_name\n\
         sdq,sdq_1,SDQ1,exact,Q1\n\
         sdq,,sdq_extra,,\n",
    );
    write(dir, "imputation.csv", "new_name,original\n");
    write(dir, "exclusions.csv", "column_name\nsdq_complete\n");
    write(dir, "aliases.csv", "alias,questionnaire\n");
    write(dir, "rules.csv", "questionnaire,rule\nsdq,DEFAULT\n");
    write(
        dir,
        "dictionary.csv",
        &format!(
            "Variable / Field Name,Form Name,Field Type,Field Label,\
             \"Choices, Calculations, OR Slider Labels\"\n\
             sdq_1,sdq,radio,Considerate,{SDQ_CHOICES}\n\
             sdq_2,sdq,radio,Restless,{SDQ_CHOICES}\n\
             sdq_3,sdq,radio,Headaches,{SDQ_CHOICES}\n"
        ),
    );
    write(dir, "exceptional.csv", "question_name\n");
    write(dir, "roles.csv", "questionnaire,participant_type\nsdq,Child\n");
    write(
        dir,
        "score_rules.toml",
        r#"
[[rule]]
questionnaire = "sdq"
method = "sum"
columns = "DEFAULT"
reversed_columns = ["sdq_2"]

[[rule.cluster]]
name = "sdq_pair"
columns = ["sdq_1", "sdq_2"]
"#,
    );
    write(
        dir,
        "qmeta.toml",
        r#"
[project]
name = "pilot"

[inputs]
source_a = "a.csv"
source_b = "b.csv"
companion = "companion.csv"
imputation = "imputation.csv"
exclusions = "exclusions.csv"
aliases = "aliases.csv"
rules = "rules.csv"
dictionary = "dictionary.csv"
exceptional_items = "exceptional.csv"
participant_roles = "roles.csv"
score_rules = "score_rules.toml"
"#,
    )
}

#[test]
fn session_reconciles_and_builds_catalog() {
    let dir = temp_dir("session");
    let manifest = write_project(&dir);
    let session = Session::open(&manifest).expect("open session");
    assert_eq!(session.project_name(), "pilot");
    assert_eq!(session.fingerprint().len(), 64);

    let mapping = &session.mapping;
    assert_eq!(mapping.rows().len(), 6);
    let first = mapping.find("sdq_1").expect("sdq_1 row");
    assert_eq!(first.provenance, Provenance::Both);
    assert_eq!(first.source_b_name.as_deref(), Some("sdq_1"));
    assert_eq!(
        mapping.find("sdq_extra").map(|row| row.provenance),
        Some(Provenance::Companion)
    );
    assert!(mapping.warnings().is_empty());

    let catalog = &session.catalog.catalog;
    assert_eq!(
        catalog.get("sdq_1").map(|q| q.question_type),
        Some(QuestionType::Ordinal)
    );
    assert!(catalog.get("sdq_timestamp").is_some_and(|q| q.is_timestamp));
    assert!(catalog.contains(AGE_VARIABLE));
    assert!(catalog.contains(EVENT_VARIABLE));
    let mut unmatched = session.catalog.unmatched_mapping.clone();
    unmatched.sort();
    assert_eq!(unmatched, ["sdq_9", "sdq_extra"]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn registry_resolves_default_columns_and_range() {
    let dir = temp_dir("registry");
    let manifest = write_project(&dir);
    let session = Session::open(&manifest).expect("open session");
    let build = session.score_registry().expect("score registry");
    assert!(build.rejected.is_empty());

    let info = build.registry.get("sdq").expect("sdq descriptor");
    assert_eq!(info.columns(), ["sdq_1", "sdq_2", "sdq_3"]);
    assert_eq!(info.range(), Some((0.0, 2.0)));

    let summaries = session.questionnaire_summaries(&build);
    let sdq = summaries
        .iter()
        .find(|summary| summary.questionnaire == "sdq")
        .expect("sdq summary");
    assert!(sdq.has_scoring);
    assert_eq!(sdq.scorable_items, 3);
    assert_eq!(sdq.timestamp_items, 1);
    assert_eq!((sdq.forms_items, sdq.companion_items, sdq.both_items), (3, 0, 1));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn responses_are_scored_and_written() {
    let dir = temp_dir("score");
    let manifest = write_project(&dir);
    let session = Session::open(&manifest).expect("open session");
    let build = session.score_registry().expect("score registry");
    let responses = write(
        &dir,
        "responses.csv",
        "record_id,sdq_1,sdq_2,sdq_3\n1,1,0,2\n2,,,1\n",
    );
    let frame = load_responses(&responses).expect("load responses");
    let batch = score_all(&frame, &build.registry, &session.manifest.scoring).expect("score");

    assert_eq!(
        batch.scored,
        [(
            "sdq".to_string(),
            vec!["sdq_score".to_string(), "sdq_pair".to_string()]
        )]
    );
    assert_eq!(
        column_as_f64(&batch.frame, "sdq_score").expect("score column"),
        [Some(5.0), None]
    );
    assert_eq!(
        column_as_f64(&batch.frame, "sdq_pair").expect("cluster column"),
        [Some(3.0), None]
    );

    let mut scored = batch.frame;
    let output = dir.join("scored.csv");
    write_frame_csv(&mut scored, &output).expect("write scored table");
    let written = fs::read_to_string(&output).expect("read scored table");
    assert!(written.starts_with("record_id,sdq_1,sdq_2,sdq_3,sdq_score,sdq_pair"));
    let _ = fs::remove_dir_all(&dir);
}
