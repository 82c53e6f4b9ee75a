//! FHIR RelatedPerson resource

use super::Resource;
use crate::r5::codes::AdministrativeGender;
use crate::r5::datatypes::{
    Address, Attachment, CodeableConcept, ContactPoint, Extension, HumanName, Identifier, Meta,
    Narrative, Period, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A person that is related to a patient, but who is not a direct target of care
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPerson {
    /// Resource type - always "RelatedPerson"
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

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// The patient this person is related to
    pub patient: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<Attachment>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<Vec<RelatedPersonCommunication>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "RelatedPerson".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPersonCommunication {
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

impl RelatedPerson {
    pub fn new(patient: Reference) -> Self {
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
            patient,
            relationship: None,
            name: None,
            telecom: None,
            gender: None,
            birth_date: None,
            address: None,
            photo: None,
            period: None,
            communication: None,
            additional: HashMap::new(),
        }
    }
}

impl RelatedPersonCommunication {
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

impl_fhir_resource!(RelatedPerson);

impl Validate for RelatedPerson {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "RelatedPerson");
        ctx.each("identifier", &self.identifier);
        ctx.field("patient", &self.patient);
        ctx.each("relationship", &self.relationship);
        ctx.each("name", &self.name);
        ctx.each("telecom", &self.telecom);
        ctx.date("birthDate", self.birth_date.as_deref());
        ctx.each("address", &self.address);
        ctx.each("photo", &self.photo);
        ctx.optional("period", &self.period);
        ctx.each("communication", &self.communication);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for RelatedPersonCommunication {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("language", &self.language);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_related_person_requires_patient() {
        let result = RelatedPerson::from_value(json!({"resourceType": "RelatedPerson"}));
        assert!(result.is_err());

        let person = RelatedPerson::new(Reference::new("Patient/example"));
        assert!(person.validate().valid);
        assert_eq!(person.to_value().unwrap()["patient"]["reference"], "Patient/example");
    }

    #[test]
    fn test_period_order_is_checked() {
        let mut person = RelatedPerson::new(Reference::new("Patient/example"));
        person.period = Some(Period::new(Some("2020-01-01"), Some("2019-01-01")));
        let outcome = person.validate();
        assert!(!outcome.valid);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("RelatedPerson.period"));
    }
}
