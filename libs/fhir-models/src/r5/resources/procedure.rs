//! FHIR Procedure resource

use super::Resource;
use crate::r5::codes::EventStatus;
use crate::r5::datatypes::{
    Age, Annotation, CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative,
    Period, Range, Reference, Timing,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An action that is or was performed on or for a patient, practitioner, device, organization,
/// or location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    /// Resource type - always "Procedure"
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
    pub instantiates_canonical: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instantiates_uri: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Vec<Reference>>,

    pub status: EventStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    /// Identification of the procedure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// When the procedure occurred or is occurring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_age: Option<Age>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_timing: Option<Timing>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorder: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<ProcedurePerformer>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub complication: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_device: Option<Vec<ProcedureFocalDevice>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_info: Option<Vec<Reference>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Procedure".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcedurePerformer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<CodeableConcept>,

    pub actor: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureFocalDevice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CodeableConcept>,

    pub manipulated: Reference,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Procedure {
    pub fn new(status: EventStatus, subject: Reference) -> Self {
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
            instantiates_canonical: None,
            instantiates_uri: None,
            based_on: None,
            part_of: None,
            status,
            status_reason: None,
            category: None,
            code: None,
            subject,
            focus: None,
            encounter: None,
            occurrence_date_time: None,
            occurrence_period: None,
            occurrence_string: None,
            occurrence_age: None,
            occurrence_range: None,
            occurrence_timing: None,
            recorded: None,
            recorder: None,
            reported_boolean: None,
            reported_reference: None,
            performer: None,
            location: None,
            reason: None,
            body_site: None,
            outcome: None,
            report: None,
            complication: None,
            follow_up: None,
            note: None,
            focal_device: None,
            used: None,
            supporting_info: None,
            additional: HashMap::new(),
        }
    }
}

impl ProcedurePerformer {
    pub fn new(actor: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            function: None,
            actor,
            on_behalf_of: None,
            period: None,
            additional: HashMap::new(),
        }
    }
}

impl ProcedureFocalDevice {
    pub fn new(manipulated: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            action: None,
            manipulated,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Procedure);

impl Validate for Procedure {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Procedure");
        ctx.each("identifier", &self.identifier);
        ctx.uris("instantiatesCanonical", &self.instantiates_canonical);
        ctx.uris("instantiatesUri", &self.instantiates_uri);
        ctx.each("basedOn", &self.based_on);
        ctx.each("partOf", &self.part_of);
        ctx.optional("statusReason", &self.status_reason);
        ctx.each("category", &self.category);
        ctx.optional("code", &self.code);
        ctx.field("subject", &self.subject);
        ctx.optional("focus", &self.focus);
        ctx.optional("encounter", &self.encounter);
        ctx.choice(
            "occurrence[x]",
            &[
                ("occurrenceDateTime", self.occurrence_date_time.is_some()),
                ("occurrencePeriod", self.occurrence_period.is_some()),
                ("occurrenceString", self.occurrence_string.is_some()),
                ("occurrenceAge", self.occurrence_age.is_some()),
                ("occurrenceRange", self.occurrence_range.is_some()),
                ("occurrenceTiming", self.occurrence_timing.is_some()),
            ],
        );
        ctx.date_time("occurrenceDateTime", self.occurrence_date_time.as_deref());
        ctx.optional("occurrencePeriod", &self.occurrence_period);
        ctx.optional("occurrenceAge", &self.occurrence_age);
        ctx.optional("occurrenceRange", &self.occurrence_range);
        ctx.optional("occurrenceTiming", &self.occurrence_timing);
        ctx.date_time("recorded", self.recorded.as_deref());
        ctx.optional("recorder", &self.recorder);
        ctx.choice(
            "reported[x]",
            &[
                ("reportedBoolean", self.reported_boolean.is_some()),
                ("reportedReference", self.reported_reference.is_some()),
            ],
        );
        ctx.optional("reportedReference", &self.reported_reference);
        ctx.each("performer", &self.performer);
        ctx.optional("location", &self.location);
        ctx.each("reason", &self.reason);
        ctx.each("bodySite", &self.body_site);
        ctx.optional("outcome", &self.outcome);
        ctx.each("report", &self.report);
        ctx.each("complication", &self.complication);
        ctx.each("followUp", &self.follow_up);
        ctx.each("note", &self.note);
        ctx.each("focalDevice", &self.focal_device);
        ctx.each("used", &self.used);
        ctx.each("supportingInfo", &self.supporting_info);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ProcedurePerformer {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("function", &self.function);
        ctx.field("actor", &self.actor);
        ctx.optional("onBehalfOf", &self.on_behalf_of);
        ctx.optional("period", &self.period);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ProcedureFocalDevice {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("action", &self.action);
        ctx.field("manipulated", &self.manipulated);
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
    fn test_procedure_parse() {
        let procedure = Procedure::from_value(json!({
            "resourceType": "Procedure",
            "status": "completed",
            "code": {"text": "Appendectomy"},
            "subject": {"reference": "Patient/example"},
            "occurrencePeriod": {"start": "2013-01-28T13:31:00+01:00", "end": "2013-01-28T14:27:00+01:00"},
            "performer": [{"actor": {"reference": "Practitioner/example"}}],
            "focalDevice": [{"manipulated": {"reference": "Device/pump"}}]
        }))
        .unwrap();

        assert_eq!(procedure.status, EventStatus::Completed);
        assert!(procedure.validate().valid);
    }

    #[test]
    fn test_performer_requires_actor() {
        let result = Procedure::from_value(json!({
            "resourceType": "Procedure",
            "status": "completed",
            "subject": {"reference": "Patient/example"},
            "performer": [{"function": {"text": "surgeon"}}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_instantiates_uri_format() {
        let mut procedure = Procedure::new(EventStatus::InProgress, Reference::new("Patient/p"));
        procedure.instantiates_uri = Some(vec!["not a uri".to_string()]);
        procedure.reported_boolean = Some(true);
        procedure.reported_reference = Some(Reference::new("Patient/p"));

        let outcome = procedure.validate();
        assert_eq!(outcome.error_count(), 2);
        assert_eq!(outcome.issues[0].code, IssueType::Value);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Procedure.instantiatesUri[0]")
        );
        assert_eq!(outcome.issues[1].location.as_deref(), Some("Procedure.reported[x]"));
    }
}
