//! FHIR Condition resource

use super::Resource;
use crate::r5::datatypes::{
    Age, Annotation, CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative,
    Period, Range, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A clinical condition, problem, diagnosis, or other event, situation, issue, or clinical
/// concept that has risen to a level of concern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Resource type - always "Condition"
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

    /// active | recurrence | relapse | inactive | remission | resolved | unknown
    pub clinical_status: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<CodeableConcept>,

    /// Identification of the condition, problem or diagnosis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<Vec<CodeableConcept>>,

    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Estimated or actual date,  date-time, or age
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

    /// When in resolution/remission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_age: Option<Age>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<ConditionParticipant>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Vec<ConditionStage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Condition".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionParticipant {
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

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionStage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Vec<Reference>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Condition {
    pub fn new(clinical_status: CodeableConcept, subject: Reference) -> Self {
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
            clinical_status,
            verification_status: None,
            category: None,
            severity: None,
            code: None,
            body_site: None,
            subject,
            encounter: None,
            onset_date_time: None,
            onset_age: None,
            onset_period: None,
            onset_range: None,
            onset_string: None,
            abatement_date_time: None,
            abatement_age: None,
            abatement_period: None,
            abatement_range: None,
            abatement_string: None,
            recorded_date: None,
            participant: None,
            stage: None,
            evidence: None,
            note: None,
            additional: HashMap::new(),
        }
    }

    /// True when the clinical status is one of the active codes
    pub fn is_active(&self) -> bool {
        ["active", "recurrence", "relapse"]
            .iter()
            .any(|code| self.clinical_status.has_coding(CONDITION_CLINICAL_SYSTEM, code))
    }
}

impl ConditionParticipant {
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

impl_fhir_resource!(Condition);

impl Validate for Condition {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Condition");
        ctx.each("identifier", &self.identifier);
        ctx.field("clinicalStatus", &self.clinical_status);
        ctx.optional("verificationStatus", &self.verification_status);
        ctx.each("category", &self.category);
        ctx.optional("severity", &self.severity);
        ctx.optional("code", &self.code);
        ctx.each("bodySite", &self.body_site);
        ctx.field("subject", &self.subject);
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
        ctx.choice(
            "abatement[x]",
            &[
                ("abatementDateTime", self.abatement_date_time.is_some()),
                ("abatementAge", self.abatement_age.is_some()),
                ("abatementPeriod", self.abatement_period.is_some()),
                ("abatementRange", self.abatement_range.is_some()),
                ("abatementString", self.abatement_string.is_some()),
            ],
        );
        ctx.date_time("abatementDateTime", self.abatement_date_time.as_deref());
        ctx.optional("abatementAge", &self.abatement_age);
        ctx.optional("abatementPeriod", &self.abatement_period);
        ctx.optional("abatementRange", &self.abatement_range);
        ctx.date_time("recordedDate", self.recorded_date.as_deref());
        ctx.each("participant", &self.participant);
        ctx.each("stage", &self.stage);
        ctx.each("evidence", &self.evidence);
        ctx.each("note", &self.note);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ConditionParticipant {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("function", &self.function);
        ctx.field("actor", &self.actor);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ConditionStage {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("summary", &self.summary);
        ctx.each("assessment", &self.assessment);
        ctx.optional("type", &self.type_);

        ctx.invariant(
            "con-1",
            self.summary.is_some() || self.assessment.is_some(),
            "Stage SHALL have summary or assessment",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Code system for `Condition.clinicalStatus`
pub const CONDITION_CLINICAL_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::datatypes::Coding;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    fn clinical(code: &str) -> CodeableConcept {
        CodeableConcept::from_coding(Coding::new(CONDITION_CLINICAL_SYSTEM, code))
    }

    #[test]
    fn test_condition_status() {
        let condition = Condition::new(clinical("relapse"), Reference::new("Patient/example"));
        assert!(condition.is_active());
        assert!(condition.validate().valid);

        let resolved = Condition::new(clinical("resolved"), Reference::new("Patient/example"));
        assert!(!resolved.is_active());
    }

    #[test]
    fn test_onset_and_abatement_choices() {
        let condition = Condition::from_value(json!({
            "resourceType": "Condition",
            "clinicalStatus": {"coding": [{"system": CONDITION_CLINICAL_SYSTEM, "code": "resolved"}]},
            "subject": {"reference": "Patient/example"},
            "onsetAge": {"value": 52, "unit": "years", "system": "http://unitsofmeasure.org", "code": "a"},
            "onsetString": "in his fifties",
            "abatementDateTime": "2014-03"
        }))
        .unwrap();

        let outcome = condition.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Condition.onset[x]"));
    }

    #[test]
    fn test_stage_needs_summary_or_assessment() {
        let mut condition = Condition::new(clinical("active"), Reference::new("Patient/example"));
        condition.stage = Some(vec![ConditionStage::default()]);

        let outcome = condition.validate();
        assert!(outcome.issues[0].diagnostics.contains("con-1"));
    }
}
