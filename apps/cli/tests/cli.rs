//! Integration tests for the hearth binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn hearth() -> Command {
    let mut cmd = Command::cargo_bin("hearth").unwrap();
    cmd.env_remove("HEARTH_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn patient_with_bad_birth_date() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "p1",
        "birthDate": "1974-02-30T"
    })
}

#[test]
fn test_types_lists_supported_resources() {
    hearth()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient"))
        .stdout(predicate::str::contains("QuestionnaireResponse"));
}

#[test]
fn test_quiet_help_matches_filter() {
    hearth()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Only log warnings and errors"));
}

#[test]
fn test_validate_valid_patient() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "patient.json",
        &json!({
            "resourceType": "Patient",
            "id": "p1",
            "gender": "female",
            "birthDate": "1980-04-01"
        }),
    );

    hearth()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (0 error(s), 0 warning(s))"));
}

#[test]
fn test_validate_reports_choice_conflict() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "observation.json",
        &json!({
            "resourceType": "Observation",
            "status": "final",
            "code": {"text": "Heart rate"},
            "valueString": "eighty",
            "valueBoolean": true
        }),
    );

    hearth()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid"))
        .stdout(predicate::str::contains("Observation.value[x]"));
}

#[test]
fn test_validate_structural_preset_skips_formats() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, "patient.json", &patient_with_bad_birth_date());

    hearth()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Patient.birthDate"));

    hearth()
        .args(["validate", "--preset", "structural"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_validate_json_output_is_operation_outcome() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, "patient.json", &patient_with_bad_birth_date());

    let output = hearth()
        .args(["validate", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["resourceType"], "OperationOutcome");
    assert_eq!(outcome["issue"][0]["severity"], "error");
    assert_eq!(outcome["issue"][0]["code"], "value");
}

#[test]
fn test_validate_multiple_files_summarises() {
    let dir = TempDir::new().unwrap();
    let good = write_json(
        &dir,
        "good.json",
        &json!({"resourceType": "Patient", "id": "ok"}),
    );
    let bad = write_json(&dir, "bad.json", &patient_with_bad_birth_date());

    hearth()
        .arg("validate")
        .arg(&good)
        .arg(&bad)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 of 2 file(s) failed validation"));
}

#[test]
fn test_validate_with_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "patient.json",
        &json!({"resourceType": "Patient", "id": "p1", "nickname": "Jim"}),
    );

    hearth()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 warning(s)"));

    let config = dir.path().join("hearth.yaml");
    fs::write(&config, "schema:\n  allow_unknown_elements: false\n").unwrap();

    hearth()
        .arg("validate")
        .arg(&path)
        .env("HEARTH_CONFIG", &config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unrecognized element 'nickname'"));
}

#[test]
fn test_validate_rejects_zero_max_issues() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, "patient.json", &patient_with_bad_birth_date());

    hearth()
        .args(["validate", "--max-issues", "0"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_issues"));
}

#[test]
fn test_validate_missing_file() {
    hearth()
        .args(["validate", "does-not-exist.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("does-not-exist.json: error: failed to read"));
}

#[test]
fn test_validate_continues_past_unreadable_files() {
    let dir = TempDir::new().unwrap();
    let good = write_json(
        &dir,
        "good.json",
        &json!({"resourceType": "Patient", "id": "ok"}),
    );
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    let missing = dir.path().join("missing.json");

    hearth()
        .arg("validate")
        .arg(&missing)
        .arg(&broken)
        .arg(&good)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed to read"))
        .stdout(predicate::str::contains("is not valid JSON"))
        .stdout(predicate::str::contains("good.json: valid"))
        .stdout(predicate::str::contains("2 of 3 file(s) failed validation"));

    let output = hearth()
        .args(["validate", "--format", "json"])
        .arg(&missing)
        .arg(&good)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0]["error"]
        .as_str()
        .unwrap()
        .contains("failed to read"));
    assert!(reports[0].get("outcome").is_none());
    assert_eq!(reports[1]["outcome"]["resourceType"], "OperationOutcome");
}

#[test]
fn test_validate_json_single_unreadable_file() {
    let output = hearth()
        .args(["validate", "--format", "json", "does-not-exist.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["file"], "does-not-exist.json");
    assert!(reports[0]["error"].as_str().unwrap().contains("failed to read"));
}

#[test]
fn test_validate_nested_parse_failure_location() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "bundle.json",
        &json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "a"}},
                {"resource": {"resourceType": "Observation", "code": {"text": "Glucose"}}}
            ]
        }),
    );

    hearth()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Bundle.entry[1].resource.status"))
        .stdout(predicate::str::contains("Serialization error").not());
}

#[test]
fn test_inspect_bundle() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "bundle.json",
        &json!({
            "resourceType": "Bundle",
            "id": "b1",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "a"}},
                {"resource": {"resourceType": "Patient", "id": "b"}},
                {"resource": {"resourceType": "Organization", "id": "o"}}
            ]
        }),
    );

    hearth()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("resourceType: Bundle"))
        .stdout(predicate::str::contains("type: collection"))
        .stdout(predicate::str::contains("entries: 3"))
        .stdout(predicate::str::contains("Patient: 2"))
        .stdout(predicate::str::contains("Organization: 1"));
}
