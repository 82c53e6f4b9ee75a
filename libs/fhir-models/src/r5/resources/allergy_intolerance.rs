//! FHIR AllergyIntolerance resource

use super::Resource;
use crate::r5::codes::{
    AllergyIntoleranceCategory, AllergyIntoleranceCriticality, AllergyIntoleranceSeverity,
};
use crate::r5::datatypes::{
    Age, Annotation, CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative,
    Period, Range, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Risk of harmful or undesirable, physiological response which is unique to an individual and
/// associated with exposure to a substance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntolerance {
    /// Resource type - always "AllergyIntolerance"
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

    /// active | inactive | resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_status: Option<CodeableConcept>,

    /// unconfirmed | presumed | confirmed | refuted | entered-in-error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<CodeableConcept>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<AllergyIntoleranceCategory>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub criticality: Option<AllergyIntoleranceCriticality>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    pub patient: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_age: Option<Age>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<AllergyIntoleranceParticipant>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_occurrence: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    /// Adverse Reaction Events linked to exposure to substance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Vec<AllergyIntoleranceReaction>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "AllergyIntolerance".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntoleranceParticipant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<CodeableConcept>,

    pub actor: Reference,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntoleranceReaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance: Option<CodeableConcept>,

    /// Clinical symptoms/signs associated with the Event
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifestation: Vec<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AllergyIntoleranceSeverity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_route: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl AllergyIntolerance {
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
            clinical_status: None,
            verification_status: None,
            type_: None,
            category: None,
            criticality: None,
            code: None,
            patient,
            encounter: None,
            onset_date_time: None,
            onset_age: None,
            onset_period: None,
            onset_range: None,
            onset_string: None,
            recorded_date: None,
            participant: None,
            last_occurrence: None,
            note: None,
            reaction: None,
            additional: HashMap::new(),
        }
    }
}

impl AllergyIntoleranceParticipant {
    pub fn new(actor: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            function: None,
            actor,
            additional: HashMap::new(),
        }
    }
}

impl AllergyIntoleranceReaction {
    pub fn new(manifestation: Vec<CodeableReference>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            substance: None,
            manifestation,
            description: None,
            onset: None,
            severity: None,
            exposure_route: None,
            note: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(AllergyIntolerance);

impl Validate for AllergyIntolerance {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "AllergyIntolerance");
        ctx.each("identifier", &self.identifier);
        ctx.optional("clinicalStatus", &self.clinical_status);
        ctx.optional("verificationStatus", &self.verification_status);
        ctx.optional("type", &self.type_);
        ctx.optional("code", &self.code);
        ctx.field("patient", &self.patient);
        ctx.optional("encounter", &self.encounter);
        ctx.choice(
            "onset[x]",
            &[
                ("onsetDateTime", self.onset_date_time.is_some()),
                ("onsetAge", self.onset_age.is_some()),
                ("onsetPeriod", self.onset_period.is_some()),
                ("onsetRange", self.onset_range.is_some()),
                ("onsetString", self.onset_string.is_some()),
            ],
        );
        ctx.date_time("onsetDateTime", self.onset_date_time.as_deref());
        ctx.optional("onsetAge", &self.onset_age);
        ctx.optional("onsetPeriod", &self.onset_period);
        ctx.optional("onsetRange", &self.onset_range);
        ctx.date_time("recordedDate", self.recorded_date.as_deref());
        ctx.each("participant", &self.participant);
        ctx.date_time("lastOccurrence", self.last_occurrence.as_deref());
        ctx.each("note", &self.note);
        ctx.each("reaction", &self.reaction);

        let entered_in_error = self.verification_status.as_ref().is_some_and(|status| {
            status.has_coding(ALLERGY_VERIFICATION_SYSTEM, "entered-in-error")
        });
        ctx.invariant(
            "ait-1",
            entered_in_error || self.clinical_status.is_some(),
            "AllergyIntolerance.clinicalStatus SHALL be present if verificationStatus is not entered-in-error.",
        );
        ctx.invariant(
            "ait-2",
            !entered_in_error || self.clinical_status.is_none(),
            "AllergyIntolerance.clinicalStatus SHALL NOT be present if verification Status is entered-in-error",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for AllergyIntoleranceParticipant {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("function", &self.function);
        ctx.field("actor", &self.actor);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for AllergyIntoleranceReaction {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("substance", &self.substance);
        ctx.required_each("manifestation", &self.manifestation);
        ctx.date_time("onset", self.onset.as_deref());
        ctx.optional("exposureRoute", &self.exposure_route);
        ctx.each("note", &self.note);
        ctx.unknown_elements(&self.additional);
    }
}

/// Code system for `AllergyIntolerance.verificationStatus`
pub const ALLERGY_VERIFICATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::{AllergyIntoleranceCriticality, IssueType};
    use crate::r5::datatypes::Coding;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_allergy_parse() {
        let allergy = AllergyIntolerance::from_value(json!({
            "resourceType": "AllergyIntolerance",
            "clinicalStatus": {"coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical",
                "code": "active"
            }]},
            "category": ["food"],
            "criticality": "high",
            "code": {"text": "Cashew nuts"},
            "patient": {"reference": "Patient/example"},
            "reaction": [{
                "manifestation": [{"concept": {"text": "Anaphylactic reaction"}}],
                "severity": "severe"
            }]
        }))
        .unwrap();

        assert_eq!(allergy.criticality, Some(AllergyIntoleranceCriticality::High));
        assert!(allergy.validate().valid);
    }

    #[test]
    fn test_reaction_needs_manifestation() {
        let allergy = AllergyIntolerance::from_value(json!({
            "resourceType": "AllergyIntolerance",
            "clinicalStatus": {"text": "active"},
            "patient": {"reference": "Patient/example"},
            "reaction": [{"description": "rash"}]
        }))
        .unwrap();

        let outcome = allergy.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("AllergyIntolerance.reaction[0].manifestation")
        );
    }

    #[test]
    fn test_clinical_status_rules() {
        let mut allergy = AllergyIntolerance::new(Reference::new("Patient/example"));
        let outcome = allergy.validate();
        assert!(outcome.issues[0].diagnostics.contains("ait-1"));

        allergy.verification_status = Some(CodeableConcept::from_coding(Coding::new(
            ALLERGY_VERIFICATION_SYSTEM,
            "entered-in-error",
        )));
        assert!(allergy.validate().valid);

        allergy.clinical_status = Some(CodeableConcept::from_text("active"));
        let outcome = allergy.validate();
        assert!(outcome.issues[0].diagnostics.contains("ait-2"));
    }
}
