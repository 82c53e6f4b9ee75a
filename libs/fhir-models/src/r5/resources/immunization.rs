//! FHIR Immunization resource

use super::Resource;
use crate::r5::codes::ImmunizationStatus;
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative,
    Reference, SimpleQuantity,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Describes the event of a patient being administered a vaccine or a record of an immunization
/// as reported by a patient, a clinician or another party
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Immunization {
    /// Resource type - always "Immunization"
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

    pub status: ImmunizationStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<CodeableConcept>,

    /// Vaccine administered
    pub vaccine_code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub administered_product: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    pub patient: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_information: Option<Vec<Reference>>,

    /// Vaccine administration date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_source: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_source: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_quantity: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<ImmunizationPerformer>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subpotent: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpotent_reason: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_eligibility: Option<Vec<ImmunizationProgramEligibility>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_source: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Vec<ImmunizationReaction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_applied: Option<Vec<ImmunizationProtocolApplied>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Immunization".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImmunizationPerformer {
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
pub struct ImmunizationProgramEligibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub program: CodeableConcept,

    pub program_status: CodeableConcept,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImmunizationReaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifestation: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<bool>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImmunizationProtocolApplied {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_disease: Option<Vec<CodeableConcept>>,

    /// Dose number within series
    pub dose_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_doses: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Immunization {
    pub fn new(
        status: ImmunizationStatus,
        vaccine_code: CodeableConcept,
        patient: Reference,
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
            status,
            status_reason: None,
            vaccine_code,
            administered_product: None,
            manufacturer: None,
            lot_number: None,
            expiration_date: None,
            patient,
            encounter: None,
            supporting_information: None,
            occurrence_date_time: None,
            occurrence_string: None,
            primary_source: None,
            information_source: None,
            location: None,
            site: None,
            route: None,
            dose_quantity: None,
            performer: None,
            note: None,
            reason: None,
            is_subpotent: None,
            subpotent_reason: None,
            program_eligibility: None,
            funding_source: None,
            reaction: None,
            protocol_applied: None,
            additional: HashMap::new(),
        }
    }
}

impl ImmunizationPerformer {
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

impl ImmunizationProgramEligibility {
    pub fn new(program: CodeableConcept, program_status: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            program,
            program_status,
            additional: HashMap::new(),
        }
    }
}

impl ImmunizationProtocolApplied {
    pub fn new(dose_number: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            series: None,
            authority: None,
            target_disease: None,
            dose_number: dose_number.into(),
            series_doses: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Immunization);

impl Validate for Immunization {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Immunization");
        ctx.each("identifier", &self.identifier);
        ctx.each("basedOn", &self.based_on);
        ctx.optional("statusReason", &self.status_reason);
        ctx.field("vaccineCode", &self.vaccine_code);
        ctx.optional("administeredProduct", &self.administered_product);
        ctx.optional("manufacturer", &self.manufacturer);
        ctx.date("expirationDate", self.expiration_date.as_deref());
        ctx.field("patient", &self.patient);
        ctx.optional("encounter", &self.encounter);
        ctx.each("supportingInformation", &self.supporting_information);
        ctx.required_choice(
            "occurrence[x]",
            &[
                ("occurrenceDateTime", self.occurrence_date_time.is_some()),
                ("occurrenceString", self.occurrence_string.is_some()),
            ],
        );
        ctx.date_time("occurrenceDateTime", self.occurrence_date_time.as_deref());
        ctx.optional("informationSource", &self.information_source);
        ctx.optional("location", &self.location);
        ctx.optional("site", &self.site);
        ctx.optional("route", &self.route);
        ctx.optional("doseQuantity", &self.dose_quantity);
        ctx.each("performer", &self.performer);
        ctx.each("note", &self.note);
        ctx.each("reason", &self.reason);
        ctx.each("subpotentReason", &self.subpotent_reason);
        ctx.each("programEligibility", &self.program_eligibility);
        ctx.optional("fundingSource", &self.funding_source);
        ctx.each("reaction", &self.reaction);
        ctx.each("protocolApplied", &self.protocol_applied);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ImmunizationPerformer {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("function", &self.function);
        ctx.field("actor", &self.actor);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ImmunizationProgramEligibility {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("program", &self.program);
        ctx.field("programStatus", &self.program_status);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ImmunizationReaction {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.date_time("date", self.date.as_deref());
        ctx.optional("manifestation", &self.manifestation);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ImmunizationProtocolApplied {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("authority", &self.authority);
        ctx.each("targetDisease", &self.target_disease);
        ctx.required_str("doseNumber", &self.dose_number);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_immunization_parse() {
        let immunization = Immunization::from_value(json!({
            "resourceType": "Immunization",
            "status": "completed",
            "vaccineCode": {"coding": [{"system": "http://hl7.org/fhir/sid/cvx", "code": "140"}]},
            "patient": {"reference": "Patient/example"},
            "occurrenceDateTime": "2013-01-10",
            "primarySource": true,
            "protocolApplied": [{"series": "2-dose", "doseNumber": "1"}]
        }))
        .unwrap();

        assert_eq!(immunization.status, ImmunizationStatus::Completed);
        assert!(immunization.validate().valid);
    }

    #[test]
    fn test_occurrence_is_required() {
        let immunization = Immunization::new(
            ImmunizationStatus::NotDone,
            CodeableConcept::from_text("Flu"),
            Reference::new("Patient/example"),
        );

        let outcome = immunization.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Immunization.occurrence[x]"));
    }

    #[test]
    fn test_dose_number_must_have_content() {
        let mut immunization = Immunization::new(
            ImmunizationStatus::Completed,
            CodeableConcept::from_text("Flu"),
            Reference::new("Patient/example"),
        );
        immunization.occurrence_string = Some("last autumn".to_string());
        immunization.protocol_applied = Some(vec![ImmunizationProtocolApplied::new("")]);

        let outcome = immunization.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Immunization.protocolApplied[0].doseNumber")
        );
    }
}
