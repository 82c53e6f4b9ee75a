use hearth_models::r5::codes::{AdministrativeGender, BundleType, IssueSeverity, IssueType};
use hearth_models::r5::resources::{Observation, ObservationValue, Patient};
use hearth_models::{FhirResource, Preset, Resource, Validator, ValidatorConfig};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{fs::File, path::PathBuf};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn load_fixture<T: DeserializeOwned>(relative: &str) -> T {
    let path = fixtures_root().join(relative);
    assert!(path.exists(), "fixture missing at {:?}", path);

    let file = File::open(&path).expect("failed to open fixture");
    serde_json::from_reader(file).expect("failed to deserialize fixture")
}

#[test]
fn parse_patient_example() {
    let patient: Patient = load_fixture("patient-example.json");

    assert_eq!(patient.resource_type, "Patient");
    assert_eq!(patient.id.as_deref(), Some("example"));
    assert_eq!(patient.gender, Some(AdministrativeGender::Male));
    assert_eq!(patient.birth_date.as_deref(), Some("1974-12-25"));
    assert!(!patient.is_deceased());

    let official = patient.official_name().expect("official name should be present");
    assert_eq!(official.family.as_deref(), Some("Chalmers"));

    // Primitive extensions are kept but never reported
    assert!(patient.additional.contains_key("_birthDate"));
    let contact = &patient.contact.as_ref().expect("contact")[0];
    let contact_name = contact.name.as_ref().expect("contact name");
    assert_eq!(
        contact_name.additional["_family"]["extension"][0]["valueString"],
        "VV"
    );
    let outcome = patient.validate();
    assert!(outcome.valid, "{:?}", outcome.issues);
    assert_eq!(outcome.warning_count(), 0);
}

#[test]
fn patient_example_round_trips() {
    let original: Value = load_fixture("patient-example.json");
    let patient = Patient::from_value(original.clone()).unwrap();
    assert_eq!(patient.to_value().unwrap(), original);
}

#[test]
fn parse_blood_pressure_panel() {
    let observation: Observation = load_fixture("observation-bp.json");

    let systolic = observation
        .component_by_code("http://loinc.org", "8480-6")
        .expect("systolic component should be present");
    match systolic.value() {
        Some(ObservationValue::Quantity(quantity)) => assert_eq!(quantity.value, Some(107.0)),
        other => panic!("unexpected value: {other:?}"),
    }
    assert!(observation.value().is_none());

    let outcome = observation.validate();
    assert!(outcome.valid, "{:?}", outcome.issues);
}

#[test]
fn dispatch_transaction_bundle() {
    let value: Value = load_fixture("bundle-transaction.json");
    let resource = Resource::from_value(value).unwrap();

    assert_eq!(resource.resource_type(), "Bundle");
    let bundle = resource.as_bundle().unwrap();
    assert_eq!(bundle.bundle_type, BundleType::Transaction);
    assert!(bundle.is_transaction());
    assert_eq!(bundle.entry_count(), 3);

    let types: Vec<&str> = bundle.resources().map(Resource::resource_type).collect();
    assert_eq!(types, vec!["Patient", "Observation"]);

    let outcome = resource.validate();
    assert!(outcome.valid, "{:?}", outcome.issues);
}

#[test]
fn invalid_searchset_reports_every_problem() {
    let value: Value = load_fixture("bundle-searchset-invalid.json");
    let outcome = Validator::default().validate_value(&value);

    assert!(!outcome.valid);
    assert_eq!(outcome.resource_type.as_deref(), Some("Bundle"));
    assert_eq!(outcome.error_count(), 4, "{:?}", outcome.issues);

    let first = outcome
        .issues_at("Bundle.entry[0].resource.birthDate")
        .next()
        .expect("birthDate format issue");
    assert_eq!(first.code, IssueType::Value);

    let choice = outcome
        .issues_at("Bundle.entry[1].resource.value[x]")
        .next()
        .expect("value[x] choice issue");
    assert_eq!(choice.code, IssueType::Structure);

    assert!(outcome
        .issues_at("Bundle.entry[1].resource.valueQuantity")
        .any(|issue| issue.diagnostics.contains("qty-3")));
    assert!(outcome
        .issues_at("Bundle.entry[1]")
        .any(|issue| issue.diagnostics.contains("bdl-3")));

    let operation_outcome = outcome.to_operation_outcome();
    assert_eq!(operation_outcome.issue.len(), 4);
    assert!(operation_outcome
        .issue
        .iter()
        .all(|issue| issue.severity == IssueSeverity::Error));

    assert!(outcome.into_result().is_err());
}

#[test]
fn structural_preset_skips_formats_and_invariants() {
    let value: Value = load_fixture("bundle-searchset-invalid.json");
    let validator = Validator::from_config(&ValidatorConfig::preset(Preset::Structural)).unwrap();

    let outcome = validator.validate_value(&value);
    assert_eq!(outcome.error_count(), 1, "{:?}", outcome.issues);
    assert_eq!(
        outcome.issues[0].location.as_deref(),
        Some("Bundle.entry[1].resource.value[x]")
    );
}

#[test]
fn validate_batch_of_fixtures() {
    let documents: Vec<Value> = [
        "patient-example.json",
        "observation-bp.json",
        "bundle-transaction.json",
        "bundle-searchset-invalid.json",
    ]
    .iter()
    .map(|name| load_fixture(name))
    .collect();

    let outcomes = Validator::default().validate_batch(&documents);
    let valid: Vec<bool> = outcomes.iter().map(|outcome| outcome.valid).collect();
    assert_eq!(valid, vec![true, true, true, false]);
}

#[test]
fn strict_unknown_elements_from_yaml() {
    let config = ValidatorConfig::from_yaml("schema:\n  allow_unknown_elements: false\n").unwrap();
    let validator = Validator::from_config(&config).unwrap();

    let mut patient: Value = load_fixture("patient-example.json");
    patient["favouriteColour"] = Value::String("green".to_string());

    let outcome = validator.validate_value(&patient);
    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.issues[0].code, IssueType::Structure);
    assert_eq!(
        outcome.issues[0].location.as_deref(),
        Some("Patient.favouriteColour")
    );
}

#[test]
fn bundle_entry_missing_status_is_located() {
    let mut bundle: Value = load_fixture("bundle-transaction.json");
    bundle["entry"][1]["resource"] = json!({
        "resourceType": "Observation",
        "code": {"text": "Glucose"}
    });

    let outcome = Validator::default().validate_value(&bundle);
    assert!(!outcome.valid);
    assert_eq!(outcome.resource_type.as_deref(), Some("Bundle"));
    assert_eq!(outcome.issues.len(), 1);

    let issue = &outcome.issues[0];
    assert_eq!(issue.code, IssueType::Structure);
    assert_eq!(
        issue.location.as_deref(),
        Some("Bundle.entry[1].resource.status")
    );
    assert_eq!(issue.diagnostics, "missing field `status`");
}
