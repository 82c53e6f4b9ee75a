//! FHIR R5 resources
//!
//! Every resource type is a plain struct implementing [`FhirResource`]. The
//! [`Resource`] enum wraps any of them and dispatches on `resourceType`, which
//! is how `contained` resources and `Bundle` entries are parsed.

mod allergy_intolerance;
mod bundle;
mod care_plan;
mod care_team;
mod code_system;
mod condition;
mod device;
mod diagnostic_report;
mod document_reference;
mod encounter;
mod goal;
mod immunization;
mod location;
mod medication;
mod medication_request;
mod medication_statement;
mod observation;
mod operation_outcome;
mod organization;
mod patient;
mod practitioner;
mod practitioner_role;
mod procedure;
mod provenance;
mod questionnaire;
mod questionnaire_response;
mod related_person;
mod service_request;
mod specimen;
mod structure_definition;
mod value_set;

pub use allergy_intolerance::*;
pub use bundle::*;
pub use care_plan::*;
pub use care_team::*;
pub use code_system::*;
pub use condition::*;
pub use device::*;
pub use diagnostic_report::*;
pub use document_reference::*;
pub use encounter::*;
pub use goal::*;
pub use immunization::*;
pub use location::*;
pub use medication::*;
pub use medication_request::*;
pub use medication_statement::*;
pub use observation::*;
pub use operation_outcome::*;
pub use organization::*;
pub use patient::*;
pub use practitioner::*;
pub use practitioner_role::*;
pub use procedure::*;
pub use provenance::*;
pub use questionnaire::*;
pub use questionnaire_response::*;
pub use related_person::*;
pub use service_request::*;
pub use specimen::*;
pub use structure_definition::*;
pub use value_set::*;

use crate::error::{Error, Result};
use crate::r5::datatypes::Meta;
use crate::validation::{Validate, ValidationContext, ValidationOutcome, Validator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_path_to_error::{Path, Segment};
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Write;

/// Behaviour shared by every resource struct
pub trait FhirResource: Validate + Serialize + DeserializeOwned + Sized {
    /// The `resourceType` value this struct models
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> Option<&str>;

    fn meta(&self) -> Option<&Meta>;

    /// Elements present in the source JSON that this struct does not model
    fn additional(&self) -> &HashMap<String, Value>;

    /// Deserialize from a JSON value.
    ///
    /// A document declaring a different `resourceType` is rejected. A missing
    /// `resourceType` is accepted and defaults to this type.
    fn from_value(value: Value) -> Result<Self> {
        if let Some(found) = value.get("resourceType").and_then(Value::as_str) {
            if found != Self::RESOURCE_TYPE {
                return Err(Error::ResourceTypeMismatch {
                    expected: Self::RESOURCE_TYPE,
                    found: found.to_string(),
                });
            }
        }
        parse_content(Self::RESOURCE_TYPE, value)
    }

    fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate with the default (strict) configuration
    fn validate(&self) -> ValidationOutcome {
        Validator::default().validate(self)
    }

    fn validate_with(&self, validator: &Validator) -> ValidationOutcome {
        validator.validate(self)
    }
}

/// Builds the [`Resource`] enum and its dispatch from one list of
/// `Variant => accessor` pairs.
macro_rules! resource_enum {
    ($($variant:ident => $accessor:ident),+ $(,)?) => {
        /// Any supported resource, tagged by its `resourceType`
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum Resource {
            $($variant(Box<$variant>),)+
        }

        /// Resource types the [`Resource`] enum can hold
        pub const SUPPORTED_TYPES: &[&str] = &[$(stringify!($variant)),+];

        impl Resource {
            pub fn resource_type(&self) -> &'static str {
                match self {
                    $(Resource::$variant(_) => <$variant as FhirResource>::RESOURCE_TYPE,)+
                }
            }

            pub fn id(&self) -> Option<&str> {
                match self {
                    $(Resource::$variant(r) => FhirResource::id(&**r),)+
                }
            }

            pub fn meta(&self) -> Option<&Meta> {
                match self {
                    $(Resource::$variant(r) => FhirResource::meta(&**r),)+
                }
            }

            pub fn additional(&self) -> &HashMap<String, Value> {
                match self {
                    $(Resource::$variant(r) => FhirResource::additional(&**r),)+
                }
            }

            fn as_any(&self) -> &dyn Any {
                match self {
                    $(Resource::$variant(r) => &**r as &dyn Any,)+
                }
            }

            /// Parse any supported resource, dispatching on `resourceType`
            pub fn from_value(value: Value) -> Result<Self> {
                let resource_type = value
                    .get("resourceType")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::MissingField("resourceType".to_string()))?
                    .to_string();

                tracing::debug!(resource_type = %resource_type, "dispatching resource");

                match resource_type.as_str() {
                    $(stringify!($variant) => {
                        let resource: $variant = parse_content(stringify!($variant), value)?;
                        Ok(Resource::$variant(Box::new(resource)))
                    })+
                    other => {
                        tracing::warn!(resource_type = %other, "unsupported resource type");
                        Err(Error::UnknownResourceType(other.to_string()))
                    }
                }
            }

            $(
                pub fn $accessor(&self) -> Option<&$variant> {
                    self.downcast_ref::<$variant>()
                }
            )+
        }

        $(
            impl From<$variant> for Resource {
                fn from(resource: $variant) -> Self {
                    Resource::$variant(Box::new(resource))
                }
            }
        )+

        impl Validate for Resource {
            fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
                match self {
                    $(Resource::$variant(r) => r.validate_into(ctx),)+
                }
            }
        }
    };
}

resource_enum! {
    AllergyIntolerance => as_allergy_intolerance,
    Bundle => as_bundle,
    CarePlan => as_care_plan,
    CareTeam => as_care_team,
    CodeSystem => as_code_system,
    Condition => as_condition,
    Device => as_device,
    DiagnosticReport => as_diagnostic_report,
    DocumentReference => as_document_reference,
    Encounter => as_encounter,
    Goal => as_goal,
    Immunization => as_immunization,
    Location => as_location,
    Medication => as_medication,
    MedicationRequest => as_medication_request,
    MedicationStatement => as_medication_statement,
    Observation => as_observation,
    OperationOutcome => as_operation_outcome,
    Organization => as_organization,
    Patient => as_patient,
    Practitioner => as_practitioner,
    PractitionerRole => as_practitioner_role,
    Procedure => as_procedure,
    Provenance => as_provenance,
    Questionnaire => as_questionnaire,
    QuestionnaireResponse => as_questionnaire_response,
    RelatedPerson => as_related_person,
    ServiceRequest => as_service_request,
    Specimen => as_specimen,
    StructureDefinition => as_structure_definition,
    ValueSet => as_value_set,
}

impl Resource {
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Borrow the wrapped resource as `T`, if that is what it holds
    pub fn downcast_ref<T: FhirResource + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn validate(&self) -> ValidationOutcome {
        Validator::default().validate_resource(self)
    }

    pub fn validate_with(&self, validator: &Validator) -> ValidationOutcome {
        validator.validate_resource(self)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = Value::deserialize(deserializer)?;
        Resource::from_value(value).map_err(|err| match err {
            // Hand the element path to the enclosing parse, minus our own type
            Error::InvalidContent { location, message } => match location.split_once('.') {
                Some((_, inner)) => D::Error::custom(format!("{NESTED_PREFIX}{inner}`: {message}")),
                None => D::Error::custom(message),
            },
            Error::SerializationError(err) => D::Error::custom(err),
            other => D::Error::custom(other),
        })
    }
}

/// Marks a failure raised inside a nested resource, followed by its path
const NESTED_PREFIX: &str = "at `";

/// Deserialize `value` as a `root` model, locating any failure by element path
pub(crate) fn parse_content<T: DeserializeOwned>(root: &str, value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let mut location = root.to_string();
        push_path(&mut location, err.path());
        let message = err.into_inner().to_string();

        let (inner, message) = match message
            .strip_prefix(NESTED_PREFIX)
            .and_then(|rest| rest.split_once("`: "))
        {
            Some((inner, rest)) => (Some(inner.to_string()), rest.to_string()),
            None => {
                // serde reports a missing field at its parent, so name the field itself
                let field = message
                    .strip_prefix("missing field `")
                    .and_then(|rest| rest.strip_suffix('`'))
                    .map(str::to_string);
                (field, message)
            }
        };
        if let Some(inner) = inner {
            location.push('.');
            location.push_str(&inner);
        }

        tracing::debug!(location = %location, error = %message, "content does not fit the model");
        Error::InvalidContent { location, message }
    })
}

/// Append a deserializer path in FHIR form: `entry[1].resource`
fn push_path(location: &mut String, path: &Path) {
    for segment in path.iter() {
        match segment {
            Segment::Seq { index } => {
                let _ = write!(location, "[{index}]");
            }
            Segment::Map { key } | Segment::Enum { variant: key } => {
                location.push('.');
                location.push_str(key);
            }
            Segment::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::{AdministrativeGender, ObservationStatus};
    use crate::r5::datatypes::CodeableConcept;
    use serde_json::json;

    #[test]
    fn test_dispatch_on_resource_type() {
        let resource = Resource::from_value(json!({
            "resourceType": "Patient",
            "id": "p1",
            "gender": "female"
        }))
        .unwrap();

        assert_eq!(resource.resource_type(), "Patient");
        assert_eq!(resource.id(), Some("p1"));
        let patient = resource.as_patient().unwrap();
        assert_eq!(patient.gender, Some(AdministrativeGender::Female));
        assert!(resource.as_observation().is_none());
    }

    #[test]
    fn test_missing_resource_type() {
        let err = Resource::from_value(json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, Error::MissingField(ref field) if field == "resourceType"));
    }

    #[test]
    fn test_unknown_resource_type() {
        let err = Resource::from_value(json!({"resourceType": "Basic"})).unwrap_err();
        assert!(matches!(err, Error::UnknownResourceType(ref name) if name == "Basic"));
    }

    #[test]
    fn test_typed_from_value_rejects_other_type() {
        let err = Patient::from_value(json!({"resourceType": "Observation"})).unwrap_err();
        match err {
            Error::ResourceTypeMismatch { expected, found } => {
                assert_eq!(expected, "Patient");
                assert_eq!(found, "Observation");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serializes_without_wrapper() {
        let observation = Observation::new(
            ObservationStatus::Final,
            CodeableConcept::from_text("Heart rate"),
        );
        let resource = Resource::from(observation);
        let value = resource.to_value().unwrap();
        assert_eq!(value["resourceType"], "Observation");
        assert_eq!(value["status"], "final");
        assert_eq!(value["code"]["text"], "Heart rate");
    }

    #[test]
    fn test_contained_resources_parse_and_validate() {
        let resource = Resource::from_value(json!({
            "resourceType": "Observation",
            "status": "final",
            "code": {"text": "Glucose"},
            "contained": [
                {"resourceType": "Patient", "id": "inline", "birthDate": "not-a-date"}
            ]
        }))
        .unwrap();

        let observation = resource.as_observation().unwrap();
        let contained = observation.contained.as_ref().unwrap();
        assert_eq!(contained[0].resource_type(), "Patient");

        let outcome = resource.validate();
        assert!(!outcome.valid);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Observation.contained[0].birthDate")
        );
    }

    #[test]
    fn test_parse_failure_names_the_element() {
        let err = Patient::from_value(json!({
            "resourceType": "Patient",
            "link": [{"other": {"reference": "Patient/other"}}]
        }))
        .unwrap_err();
        match err {
            Error::InvalidContent { location, message } => {
                assert_eq!(location, "Patient.link[0].type");
                assert_eq!(message, "missing field `type`");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = Resource::from_value(json!({
            "resourceType": "Observation",
            "status": "done",
            "code": {"text": "Glucose"}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidContent { ref location, .. } if location == "Observation.status"));
    }

    #[test]
    fn test_nested_resource_failure_keeps_full_path() {
        let err = Resource::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "a"}},
                {"resource": {
                    "resourceType": "Observation",
                    "status": "final",
                    "code": {"text": "Glucose"},
                    "contained": [{"resourceType": "Patient", "gender": "robot"}]
                }}
            ]
        }))
        .unwrap_err();
        match err {
            Error::InvalidContent { location, message } => {
                assert_eq!(location, "Bundle.entry[1].resource.contained[0].gender");
                assert!(message.starts_with("unknown variant `robot`"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_failure_message_is_not_rewrapped() {
        let err = Bundle::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [{"resource": {"resourceType": "Basic"}}]
        }))
        .unwrap_err()
        .to_string();
        assert_eq!(
            err,
            "Invalid content at Bundle.entry[0].resource: Unsupported resource type: Basic"
        );

        let err = serde_json::from_value::<Bundle>(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [{"resource": {"resourceType": "Observation", "code": {"text": "x"}}}]
        }))
        .unwrap_err()
        .to_string();
        assert!(!err.contains("Serialization error"), "{err}");
        assert!(err.contains("missing field `status`"), "{err}");
    }

    #[test]
    fn test_supported_types_cover_enum() {
        assert_eq!(SUPPORTED_TYPES.len(), 31);
        assert!(SUPPORTED_TYPES.contains(&"StructureDefinition"));
        for name in SUPPORTED_TYPES {
            let resource = Resource::from_value(json!({"resourceType": name}));
            // Dispatch must never fall through to the unsupported branch
            assert!(!matches!(resource, Err(Error::UnknownResourceType(_))));
        }
    }
}
