//! FHIR MedicationRequest resource

use super::Resource;
use crate::r5::codes::{MedicationRequestIntent, MedicationRequestStatus, RequestPriority};
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Dosage, Duration, Extension, Identifier, Meta,
    Narrative, Period, Reference, SimpleQuantity,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An order or request for both supply of the medication and the instructions for administration
/// of the medication to a patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    /// Resource type - always "MedicationRequest"
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
    pub based_on: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_prescription: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_identifier: Option<Identifier>,

    pub status: MedicationRequestStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_changed: Option<String>,

    pub intent: MedicationRequestIntent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<RequestPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_not_perform: Option<bool>,

    /// Medication to be taken
    pub medication: CodeableReference,

    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_source: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_information: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorder: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_of_therapy_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_dosage_instruction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_dose_period: Option<Period>,

    /// Specific instructions for how the medication should be taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_instruction: Option<Vec<Dosage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispense_request: Option<MedicationRequestDispenseRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<MedicationRequestSubstitution>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_history: Option<Vec<Reference>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "MedicationRequest".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequestDispenseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_fill: Option<MedicationRequestDispenseRequestInitialFill>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispense_interval: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_repeats_allowed: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_supply_duration: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispenser: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispenser_instruction: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_administration_aid: Option<CodeableConcept>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequestDispenseRequestInitialFill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Whether substitution is allowed or not
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequestSubstitution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CodeableConcept>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl MedicationRequest {
    pub fn new(
        status: MedicationRequestStatus,
        intent: MedicationRequestIntent,
        medication: CodeableReference,
        subject: Reference,
    ) -> Self {
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
            based_on: None,
            prior_prescription: None,
            group_identifier: None,
            status,
            status_reason: None,
            status_changed: None,
            intent,
            category: None,
            priority: None,
            do_not_perform: None,
            medication,
            subject,
            information_source: None,
            encounter: None,
            supporting_information: None,
            authored_on: None,
            requester: None,
            reported: None,
            performer_type: None,
            performer: None,
            device: None,
            recorder: None,
            reason: None,
            course_of_therapy_type: None,
            insurance: None,
            note: None,
            rendered_dosage_instruction: None,
            effective_dose_period: None,
            dosage_instruction: None,
            dispense_request: None,
            substitution: None,
            event_history: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(MedicationRequest);

impl Validate for MedicationRequest {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "MedicationRequest");
        ctx.each("identifier", &self.identifier);
        ctx.each("basedOn", &self.based_on);
        ctx.optional("priorPrescription", &self.prior_prescription);
        ctx.optional("groupIdentifier", &self.group_identifier);
        ctx.optional("statusReason", &self.status_reason);
        ctx.date_time("statusChanged", self.status_changed.as_deref());
        ctx.each("category", &self.category);
        ctx.field("medication", &self.medication);
        ctx.field("subject", &self.subject);
        ctx.each("informationSource", &self.information_source);
        ctx.optional("encounter", &self.encounter);
        ctx.each("supportingInformation", &self.supporting_information);
        ctx.date_time("authoredOn", self.authored_on.as_deref());
        ctx.optional("requester", &self.requester);
        ctx.optional("performerType", &self.performer_type);
        ctx.each("performer", &self.performer);
        ctx.each("device", &self.device);
        ctx.optional("recorder", &self.recorder);
        ctx.each("reason", &self.reason);
        ctx.optional("courseOfTherapyType", &self.course_of_therapy_type);
        ctx.each("insurance", &self.insurance);
        ctx.each("note", &self.note);
        ctx.optional("effectiveDosePeriod", &self.effective_dose_period);
        ctx.each("dosageInstruction", &self.dosage_instruction);
        ctx.optional("dispenseRequest", &self.dispense_request);
        ctx.optional("substitution", &self.substitution);
        ctx.each("eventHistory", &self.event_history);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for MedicationRequestDispenseRequest {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("initialFill", &self.initial_fill);
        ctx.optional("dispenseInterval", &self.dispense_interval);
        ctx.optional("validityPeriod", &self.validity_period);
        ctx.optional("quantity", &self.quantity);
        ctx.optional("expectedSupplyDuration", &self.expected_supply_duration);
        ctx.optional("dispenser", &self.dispenser);
        ctx.each("dispenserInstruction", &self.dispenser_instruction);
        ctx.optional("doseAdministrationAid", &self.dose_administration_aid);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for MedicationRequestDispenseRequestInitialFill {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("quantity", &self.quantity);
        ctx.optional("duration", &self.duration);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for MedicationRequestSubstitution {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_choice(
            "allowed[x]",
            &[
                ("allowedBoolean", self.allowed_boolean.is_some()),
                ("allowedCodeableConcept", self.allowed_codeable_concept.is_some()),
            ],
        );
        ctx.optional("allowedCodeableConcept", &self.allowed_codeable_concept);
        ctx.optional("reason", &self.reason);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    fn request() -> MedicationRequest {
        MedicationRequest::new(
            MedicationRequestStatus::Active,
            MedicationRequestIntent::Order,
            CodeableReference {
                concept: Some(CodeableConcept::from_text("Amoxicillin")),
                ..Default::default()
            },
            Reference::new("Patient/example"),
        )
    }

    #[test]
    fn test_medication_request_parse() {
        let request = MedicationRequest::from_value(json!({
            "resourceType": "MedicationRequest",
            "status": "active",
            "intent": "order",
            "medication": {"reference": {"reference": "Medication/med0316"}},
            "subject": {"reference": "Patient/pat1"},
            "authoredOn": "2015-01-15",
            "dosageInstruction": [{
                "sequence": 1,
                "text": "6 mg PO daily",
                "timing": {"repeat": {"frequency": 1, "period": 1, "periodUnit": "d"}}
            }],
            "dispenseRequest": {"numberOfRepeatsAllowed": 2, "initialFill": {"duration": {"value": 10, "unit": "days", "system": "http://unitsofmeasure.org", "code": "d"}}},
            "substitution": {"allowedBoolean": true}
        }))
        .unwrap();

        assert_eq!(request.intent, MedicationRequestIntent::Order);
        assert_eq!(
            request.dispense_request.as_ref().and_then(|d| d.number_of_repeats_allowed),
            Some(2)
        );
        assert!(request.validate().valid);
    }

    #[test]
    fn test_substitution_requires_allowed() {
        let mut request = request();
        request.substitution = Some(MedicationRequestSubstitution::default());

        let outcome = request.validate();
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("MedicationRequest.substitution.allowed[x]")
        );
    }

    #[test]
    fn test_dosage_errors_carry_path() {
        let mut request = request();
        request.dosage_instruction = Some(vec![Dosage {
            as_needed: Some(false),
            as_needed_for: Some(vec![CodeableConcept::from_text("pain")]),
            ..Default::default()
        }]);

        let outcome = request.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("MedicationRequest.dosageInstruction[0]")
        );
    }
}
