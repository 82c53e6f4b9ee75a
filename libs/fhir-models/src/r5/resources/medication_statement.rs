//! FHIR MedicationStatement resource

use super::Resource;
use crate::r5::codes::MedicationStatementStatus;
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Dosage, Extension, Identifier, Meta, Narrative,
    Period, Reference, Timing,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A record of a medication that is being consumed by a patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationStatement {
    /// Resource type - always "MedicationStatement"
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
    pub part_of: Option<Vec<Reference>>,

    pub status: MedicationStatementStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    pub medication: CodeableReference,

    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// The date/time or interval when the medication is/was/will be taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_timing: Option<Timing>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_asserted: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_source: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_clinical_information: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_dosage_instruction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<Vec<Dosage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub adherence: Option<MedicationStatementAdherence>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "MedicationStatement".to_string()
}

/// Indicates whether the medication is or is not being consumed or administered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationStatementAdherence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CodeableConcept>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl MedicationStatement {
    pub fn new(
        status: MedicationStatementStatus,
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
            part_of: None,
            status,
            category: None,
            medication,
            subject,
            encounter: None,
            effective_date_time: None,
            effective_period: None,
            effective_timing: None,
            date_asserted: None,
            information_source: None,
            derived_from: None,
            reason: None,
            note: None,
            related_clinical_information: None,
            rendered_dosage_instruction: None,
            dosage: None,
            adherence: None,
            additional: HashMap::new(),
        }
    }
}

impl MedicationStatementAdherence {
    pub fn new(code: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code,
            reason: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(MedicationStatement);

impl Validate for MedicationStatement {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "MedicationStatement");
        ctx.each("identifier", &self.identifier);
        ctx.each("partOf", &self.part_of);
        ctx.each("category", &self.category);
        ctx.field("medication", &self.medication);
        ctx.field("subject", &self.subject);
        ctx.optional("encounter", &self.encounter);
        ctx.choice(
            "effective[x]",
            &[
                ("effectiveDateTime", self.effective_date_time.is_some()),
                ("effectivePeriod", self.effective_period.is_some()),
                ("effectiveTiming", self.effective_timing.is_some()),
            ],
        );
        ctx.date_time("effectiveDateTime", self.effective_date_time.as_deref());
        ctx.optional("effectivePeriod", &self.effective_period);
        ctx.optional("effectiveTiming", &self.effective_timing);
        ctx.date_time("dateAsserted", self.date_asserted.as_deref());
        ctx.each("informationSource", &self.information_source);
        ctx.each("derivedFrom", &self.derived_from);
        ctx.each("reason", &self.reason);
        ctx.each("note", &self.note);
        ctx.each("relatedClinicalInformation", &self.related_clinical_information);
        ctx.each("dosage", &self.dosage);
        ctx.optional("adherence", &self.adherence);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for MedicationStatementAdherence {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("code", &self.code);
        ctx.optional("reason", &self.reason);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_statement_parse() {
        let statement = MedicationStatement::from_value(json!({
            "resourceType": "MedicationStatement",
            "status": "recorded",
            "medication": {"concept": {"text": "Tylenol PM"}},
            "subject": {"reference": "Patient/pat1"},
            "effectiveDateTime": "2015-01-23",
            "adherence": {"code": {"text": "taking"}}
        }))
        .unwrap();

        assert_eq!(statement.status, MedicationStatementStatus::Recorded);
        assert!(statement.validate().valid);
    }

    #[test]
    fn test_effective_choice() {
        let mut statement = MedicationStatement::new(
            MedicationStatementStatus::Draft,
            CodeableReference::default(),
            Reference::new("Patient/pat1"),
        );
        statement.effective_date_time = Some("2015-01-23".to_string());
        statement.effective_period = Some(Period::new(Some("2015-01-23"), None));

        let outcome = statement.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("MedicationStatement.effective[x]")
        );
    }
}
