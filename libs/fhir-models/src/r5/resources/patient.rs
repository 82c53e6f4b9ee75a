//! FHIR Patient resource

use super::Resource;
use crate::r5::codes::{AdministrativeGender, LinkType, NameUse};
use crate::r5::datatypes::{
    Address, Attachment, CodeableConcept, ContactPoint, Extension, HumanName, Identifier, Meta,
    Narrative, Period, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Demographics and administrative information about an individual receiving care
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Resource type - always "Patient"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Metadata about the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// A set of rules under which this content was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit_rules: Option<String>,

    /// Language of the resource content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Text summary of the resource, for human interpretation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    /// Contained, inline Resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contained: Option<Vec<Resource>>,

    /// Additional content defined by implementations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Extensions that cannot be ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// An identifier for this patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// Whether this patient's record is in active use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// A name associated with the patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    /// The date of birth for the individual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    /// Indicates if the individual is deceased or not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConcept>,

    /// Whether patient is part of a multiple birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_birth_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_birth_integer: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<Attachment>>,

    /// A contact party (e.g. guardian, partner, friend) for the patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<PatientContact>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<Vec<PatientCommunication>>,

    /// Patient's nominated primary care provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_practitioner: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,

    /// Link to a Patient or RelatedPerson resource that concerns the same actual individual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<PatientLink>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Patient".to_string()
}

/// A contact party for the patient
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientCommunication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub language: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub other: Reference,

    #[serde(rename = "type")]
    pub type_: LinkType,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Patient {
    pub fn new() -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            implicit_rules: None,
            language: None,
            text: None,
            contained: None,
            extension: None,
            modifier_extension: None,
            identifier: None,
            active: None,
            name: None,
            telecom: None,
            gender: None,
            birth_date: None,
            deceased_boolean: None,
            deceased_date_time: None,
            address: None,
            marital_status: None,
            multiple_birth_boolean: None,
            multiple_birth_integer: None,
            photo: None,
            contact: None,
            communication: None,
            general_practitioner: None,
            managing_organization: None,
            link: None,
            additional: HashMap::new(),
        }
    }

    /// The official name, falling back to the first name recorded
    pub fn official_name(&self) -> Option<&HumanName> {
        let names = self.name.as_deref()?;
        names
            .iter()
            .find(|name| name.use_ == Some(NameUse::Official))
            .or_else(|| names.first())
    }

    /// True when either deceased variant says the patient has died
    pub fn is_deceased(&self) -> bool {
        self.deceased_boolean.unwrap_or(false) || self.deceased_date_time.is_some()
    }
}

impl Default for Patient {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientCommunication {
    pub fn new(language: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            language,
            preferred: None,
            additional: HashMap::new(),
        }
    }
}

impl PatientLink {
    pub fn new(other: Reference, type_: LinkType) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            other,
            type_,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Patient);

impl Validate for Patient {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Patient");
        ctx.each("identifier", &self.identifier);
        ctx.each("name", &self.name);
        ctx.each("telecom", &self.telecom);
        ctx.date("birthDate", self.birth_date.as_deref());
        ctx.choice(
            "deceased[x]",
            &[
                ("deceasedBoolean", self.deceased_boolean.is_some()),
                ("deceasedDateTime", self.deceased_date_time.is_some()),
            ],
        );
        ctx.date_time("deceasedDateTime", self.deceased_date_time.as_deref());
        ctx.each("address", &self.address);
        ctx.optional("maritalStatus", &self.marital_status);
        ctx.choice(
            "multipleBirth[x]",
            &[
                ("multipleBirthBoolean", self.multiple_birth_boolean.is_some()),
                ("multipleBirthInteger", self.multiple_birth_integer.is_some()),
            ],
        );
        ctx.each("photo", &self.photo);
        ctx.each("contact", &self.contact);
        ctx.each("communication", &self.communication);
        ctx.each("generalPractitioner", &self.general_practitioner);
        ctx.optional("managingOrganization", &self.managing_organization);
        ctx.each("link", &self.link);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for PatientContact {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("relationship", &self.relationship);
        ctx.optional("name", &self.name);
        ctx.each("telecom", &self.telecom);
        ctx.optional("address", &self.address);
        ctx.optional("organization", &self.organization);
        ctx.optional("period", &self.period);

        ctx.invariant(
            "pat-1",
            self.name.is_some()
                || self.telecom.is_some()
                || self.address.is_some()
                || self.organization.is_some(),
            "SHALL at least contain a contact's details or a reference to an organization",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for PatientCommunication {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("language", &self.language);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for PatientLink {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("other", &self.other);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::{AdministrativeGender, IssueType};
    use crate::r5::resources::FhirResource;
    use crate::validation::{Validator, ValidatorConfig};
    use serde_json::json;

    #[test]
    fn test_patient_round_trip() {
        let input = json!({
            "resourceType": "Patient",
            "id": "example",
            "active": true,
            "name": [{"use": "official", "family": "Chalmers", "given": ["Peter", "James"]}],
            "gender": "male",
            "birthDate": "1974-12-25",
            "deceasedBoolean": false,
            "multipleBirthInteger": 2
        });

        let patient = Patient::from_value(input.clone()).unwrap();
        assert_eq!(patient.gender, Some(AdministrativeGender::Male));
        assert_eq!(patient.multiple_birth_integer, Some(2));
        assert_eq!(patient.official_name().unwrap().family.as_deref(), Some("Chalmers"));
        assert!(!patient.is_deceased());

        assert_eq!(patient.to_value().unwrap(), input);
    }

    #[test]
    fn test_new_patient_is_valid() {
        let patient = Patient::new();
        assert_eq!(patient.resource_type, "Patient");
        assert!(patient.validate().valid);
    }

    #[test]
    fn test_deceased_choice_rejects_two_variants() {
        let patient = Patient::from_value(json!({
            "resourceType": "Patient",
            "deceasedBoolean": true,
            "deceasedDateTime": "2020-01-01"
        }))
        .unwrap();

        let outcome = patient.validate();
        assert!(!outcome.valid);
        assert_eq!(outcome.issues[0].code, IssueType::Structure);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Patient.deceased[x]"));
    }

    #[test]
    fn test_link_requires_type() {
        let err = Patient::from_value(json!({
            "resourceType": "Patient",
            "link": [{"other": {"reference": "Patient/other"}}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn test_contact_needs_details() {
        let mut patient = Patient::new();
        patient.communication = Some(vec![PatientCommunication::new(CodeableConcept::default())]);
        // An empty CodeableConcept is structurally fine
        assert!(patient.validate().valid);

        patient.contact = Some(vec![PatientContact::default()]);
        let outcome = patient.validate();
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].diagnostics.contains("pat-1"));
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Patient.contact[0]"));
    }

    #[test]
    fn test_unknown_element_is_kept_and_reported() {
        let patient = Patient::from_value(json!({
            "resourceType": "Patient",
            "favouriteColour": "blue"
        }))
        .unwrap();

        assert_eq!(patient.additional["favouriteColour"], "blue");
        let outcome = patient.validate();
        assert!(outcome.valid);
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn test_nested_extras_round_trip_and_are_reported() {
        let input = json!({
            "resourceType": "Patient",
            "name": [{
                "family": "Chalmers",
                "given": ["Peter"],
                "_given": [{"extension": [{
                    "url": "http://hl7.org/fhir/StructureDefinition/iso21090-EN-qualifier",
                    "valueCode": "CL"
                }]}],
                "familyy": "Chalmers"
            }],
            "contact": [{
                "name": {"family": "du Marché"},
                "gender": "female",
                "madeUp": 1
            }]
        });

        let patient = Patient::from_value(input.clone()).unwrap();
        let name = &patient.name.as_ref().unwrap()[0];
        assert!(name.additional.contains_key("_given"));
        assert_eq!(patient.to_value().unwrap(), input);

        let outcome = patient.validate();
        assert!(outcome.valid);
        assert_eq!(outcome.warning_count(), 2);
        assert!(outcome.issues_at("Patient.name[0].familyy").next().is_some());
        assert!(outcome.issues_at("Patient.contact[0].madeUp").next().is_some());

        let strict = Validator::from_config(
            &ValidatorConfig::builder()
                .allow_unknown_elements(false)
                .build(),
        )
        .unwrap();
        let outcome = patient.validate_with(&strict);
        assert_eq!(outcome.error_count(), 2);
        assert!(outcome
            .issues
            .iter()
            .all(|issue| issue.code == IssueType::Structure));
    }
}
