//! FHIR PractitionerRole resource

use super::Resource;
use crate::r5::datatypes::{
    Availability, CodeableConcept, ExtendedContactDetail, Extension, Identifier, Meta, Narrative,
    Period, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Roles/organizations the practitioner is associated with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerRole {
    /// Resource type - always "PractitionerRole"
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

    /// The period during which the practitioner is authorized to perform in these role(s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,

    /// Roles which this practitioner may perform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcare_service: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ExtendedContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<Vec<CodeableConcept>>,

    /// Times the practitioner is available at this location and/or healthcare service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<Availability>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Vec<Reference>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "PractitionerRole".to_string()
}

impl PractitionerRole {
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
            period: None,
            practitioner: None,
            organization: None,
            code: None,
            specialty: None,
            location: None,
            healthcare_service: None,
            contact: None,
            characteristic: None,
            communication: None,
            availability: None,
            endpoint: None,
            additional: HashMap::new(),
        }
    }
}

impl Default for PractitionerRole {
    fn default() -> Self {
        Self::new()
    }
}

impl_fhir_resource!(PractitionerRole);

impl Validate for PractitionerRole {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "PractitionerRole");
        ctx.each("identifier", &self.identifier);
        ctx.optional("period", &self.period);
        ctx.optional("practitioner", &self.practitioner);
        ctx.optional("organization", &self.organization);
        ctx.each("code", &self.code);
        ctx.each("specialty", &self.specialty);
        ctx.each("location", &self.location);
        ctx.each("healthcareService", &self.healthcare_service);
        ctx.each("contact", &self.contact);
        ctx.each("characteristic", &self.characteristic);
        ctx.each("communication", &self.communication);
        ctx.each("availability", &self.availability);
        ctx.each("endpoint", &self.endpoint);

        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_availability_rules_apply() {
        let role = PractitionerRole::from_value(json!({
            "resourceType": "PractitionerRole",
            "practitioner": {"reference": "Practitioner/example"},
            "availability": [{
                "availableTime": [{
                    "daysOfWeek": ["mon", "tue"],
                    "allDay": true,
                    "availableStartTime": "09:00:00"
                }]
            }]
        }))
        .unwrap();

        let outcome = role.validate();
        assert!(!outcome.valid);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("PractitionerRole.availability[0].availableTime[0]")
        );
    }

    #[test]
    fn test_empty_role_is_valid() {
        assert!(PractitionerRole::default().validate().valid);
    }
}
