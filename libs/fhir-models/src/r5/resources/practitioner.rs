//! FHIR Practitioner resource

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

/// A person with a formal responsibility in the provisioning of healthcare or related services
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    /// Resource type - always "Practitioner"
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

    /// The name(s) associated with the practitioner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<Attachment>>,

    /// Qualifications, certifications, accreditations, licenses, training, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<Vec<PractitionerQualification>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<Vec<PractitionerCommunication>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Practitioner".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerQualification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerCommunication {
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

impl Practitioner {
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
            photo: None,
            qualification: None,
            communication: None,
            additional: HashMap::new(),
        }
    }
}

impl Default for Practitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl PractitionerQualification {
    pub fn new(code: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            identifier: None,
            code,
            period: None,
            issuer: None,
            additional: HashMap::new(),
        }
    }
}

impl PractitionerCommunication {
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

impl_fhir_resource!(Practitioner);

impl Validate for Practitioner {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Practitioner");
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
        ctx.each("photo", &self.photo);
        ctx.each("qualification", &self.qualification);
        ctx.each("communication", &self.communication);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for PractitionerQualification {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("identifier", &self.identifier);
        ctx.field("code", &self.code);
        ctx.optional("period", &self.period);
        ctx.optional("issuer", &self.issuer);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for PractitionerCommunication {
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
    fn test_practitioner_with_qualification() {
        let practitioner = Practitioner::from_value(json!({
            "resourceType": "Practitioner",
            "id": "dr-adam",
            "name": [{"family": "Careful", "given": ["Adam"], "prefix": ["Dr"]}],
            "qualification": [{
                "identifier": [{"system": "http://example.org/UniversityIdentifier", "value": "12345"}],
                "code": {"text": "Bachelor of Science"},
                "period": {"start": "1995"}
            }]
        }))
        .unwrap();

        let qualification = &practitioner.qualification.as_ref().unwrap()[0];
        assert_eq!(qualification.code.text.as_deref(), Some("Bachelor of Science"));
        assert!(practitioner.validate().valid);
    }

    #[test]
    fn test_qualification_without_code_fails_to_parse() {
        let result = Practitioner::from_value(json!({
            "resourceType": "Practitioner",
            "qualification": [{"period": {"start": "1995"}}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_birth_date_is_reported() {
        let mut practitioner = Practitioner::default();
        practitioner.birth_date = Some("31/12/1970".to_string());
        let outcome = practitioner.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Practitioner.birthDate"));
    }
}
