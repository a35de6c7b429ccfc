use std::fs;
use std::path::{Path, PathBuf};

use qmeta_ingest::{
    IngestError, ProjectInputs, ProjectManifest, load_companion_table, load_dictionary,
    load_participant_roles, load_responses, load_rule_table, load_source_registry,
};
use qmeta_model::{FieldKind, ParticipantRole, SuffixRule, TransformationRule, VariantRenameRules};

fn temp_dir(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("qmeta_ingest_{tag}_{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn registry_splits_joined_columns() {
    let dir = temp_dir("registry");
    let path = write(
        &dir,
        "a.csv",
        "\u{feff}questionnaire_name,column_names\nsdq,\"sdq_1,sdq_2, sdq_3\"\nempty,\n",
    );
    let registry = load_source_registry(&path).expect("load registry");
    assert_eq!(registry.columns("sdq").map(<[String]>::len), Some(3));
    assert_eq!(registry.columns("empty").map(<[String]>::len), Some(0));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn companion_nulls_are_preserved() {
    let dir = temp_dir("companion");
    let path = write(
        &dir,
        "companion.csv",
        "questionnaire,canonical_name,companion_name,match_type,original_companion_name\n\
         sdq,sdq_1,SDQ1,exact,Q1\n\
         sdq,,SDQ_extra,,\n",
    );
    let table = load_companion_table(&path).expect("load companion");
    assert_eq!(table.len(), 2);
    assert_eq!(table.entries()[1].canonical_name, None);
    assert_eq!(table.entries()[0].original_companion_name.as_deref(), Some("Q1"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_rule_is_fatal() {
    let dir = temp_dir("rules");
    let ok = write(&dir, "ok.csv", "questionnaire,rule\nsdq,DEFAULT\nswan_m,extra_in_source_b\n");
    let table = load_rule_table(&ok).expect("load rules");
    assert_eq!(table.rule_for("swan_m"), Some(TransformationRule::ExtraInSourceB));

    let bad = write(&dir, "bad.csv", "questionnaire,rule\nsdq,FUZZY\n");
    let error = load_rule_table(&bad).unwrap_err();
    assert!(matches!(error, IngestError::Model { .. }));
    assert!(error.to_string().contains("FUZZY"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_required_column_is_reported() {
    let dir = temp_dir("columns");
    let path = write(&dir, "roles.csv", "questionnaire,role\nsdq,Child\n");
    let error = load_participant_roles(&path).unwrap_err();
    assert!(matches!(error, IngestError::MissingColumn { ref column, .. } if column == "participant_type"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn dictionary_rows_keep_order_and_kinds() {
    let dir = temp_dir("dictionary");
    let path = write(
        &dir,
        "dictionary.csv",
        "Variable / Field Name,Form Name,Field Type,Field Label,\
         \"Choices, Calculations, OR Slider Labels\",Text Validation Type OR Show Slider Number,\
         Text Validation Min,Text Validation Max,Branching Logic (Show field only if...)\n\
         sdq_1,sdq,radio,Considerate,\"0, Not true | 1, Somewhat true | 2, Certainly true\",,,,\n\
         ,sdq,descriptive,Header,,,,,\n\
         child_age,intro,text,Age,,number,0,18,[consent] = '1'\n",
    );
    let fields = load_dictionary(&path).expect("load dictionary");
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].kind, FieldKind::Radio);
    assert_eq!(fields[1].validation.as_deref(), Some("number"));
    assert_eq!(fields[1].validation_max.as_deref(), Some("18"));
    assert_eq!(fields[1].branching_logic.as_deref(), Some("[consent] = '1'"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn responses_load_into_a_frame() {
    let dir = temp_dir("responses");
    let path = write(&dir, "responses.csv", "id,sdq_1,sdq_2\n1,0,2\n2,NA,1\n");
    let df = load_responses(&path).expect("load responses");
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 3);
    let _ = fs::remove_dir_all(&dir);
}

fn write_project(dir: &Path, threshold: &str) -> PathBuf {
    write(dir, "a.csv", "questionnaire_name,column_names\nsdq,\"sdq_1,sdq_2\"\n");
    write(dir, "b.csv", "questionnaire_name,column_names\nsdq,sdq_1\n");
    write(
        dir,
        "companion.csv",
        "questionnaire,canonical_name,companion_name,match_type,original_companion_name\n",
    );
    write(dir, "imputation.csv", "new_name,original\n");
    write(dir, "exclusions.csv", "column_name\nsdq_complete\n");
    write(dir, "aliases.csv", "alias,questionnaire\n");
    write(dir, "rules.csv", "questionnaire,rule\nsdq,DEFAULT\n");
    write(
        dir,
        "dictionary.csv",
        "Variable / Field Name,Form Name,Field Type,Field Label\nsdq_1,sdq,yesno,First\n",
    );
    write(dir, "exceptional.csv", "question_name\n");
    write(dir, "roles.csv", "questionnaire,participant_type\nsdq,Mother\n");
    write(
        dir,
        "qmeta.toml",
        &format!(
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

[scoring]
missing_threshold = {threshold}
"#
        ),
    )
}

#[test]
fn manifest_loads_every_input() {
    let dir = temp_dir("manifest");
    let path = write_project(&dir, "0.25");
    let manifest = ProjectManifest::load(&path).expect("load manifest");
    assert_eq!(manifest.scoring.missing_threshold, 0.25);
    assert!(manifest.catalog.include_validator);
    assert_eq!(manifest.input_files().len(), 10);
    assert_eq!(manifest.variants, VariantRenameRules::default());

    let inputs = ProjectInputs::load(&manifest).expect("load inputs");
    assert_eq!(inputs.rules.len(), 1);
    assert_eq!(inputs.dictionary.len(), 1);
    assert!(inputs.auxiliary.exclusions.contains("sdq_complete"));
    assert_eq!(
        inputs.participant_roles.role_of("sdq"),
        Some(&ParticipantRole::Mother)
    );
    assert_eq!(inputs.fingerprint.len(), 64);

    let again = ProjectInputs::load(&manifest).expect("reload inputs");
    assert_eq!(inputs.fingerprint, again.fingerprint);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn manifest_rejects_bad_threshold() {
    let dir = temp_dir("threshold");
    let path = write_project(&dir, "1.5");
    let error = ProjectManifest::load(&path).unwrap_err();
    insta::assert_snapshot!(
        error.to_string(),
        @"invalid manifest: missing_threshold must be within [0, 1], got 1.5"
    );
    let _ = fs::remove_dir_all(&dir);
}

fn append(path: &Path, extra: &str) {
    let mut text = fs::read_to_string(path).expect("read manifest");
    text.push_str(extra);
    fs::write(path, text).expect("write manifest");
}

#[test]
fn manifest_reads_variant_rename_rules() {
    let dir = temp_dir("variants");
    let path = write_project(&dir, "0.5");
    append(
        &path,
        r#"
[variants]
duplicable_role = "Father"

[[variants.rules]]
from = "f"
to = "m"
"#,
    );
    let manifest = ProjectManifest::load(&path).expect("load manifest");
    assert_eq!(
        manifest.variants,
        VariantRenameRules::new(ParticipantRole::Father, vec![SuffixRule::new("f", "m")])
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn manifest_rejects_empty_rename_segment() {
    let dir = temp_dir("variants_empty");
    let path = write_project(&dir, "0.5");
    append(&path, "\n[[variants.rules]]\nfrom = \"m\"\nto = \" \"\n");
    let error = ProjectManifest::load(&path).unwrap_err();
    insta::assert_snapshot!(
        error.to_string(),
        @r#"invalid manifest: variant rename rule has an empty segment: "m" -> " ""#
    );
    let _ = fs::remove_dir_all(&dir);
}
