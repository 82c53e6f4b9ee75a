//! FHIR CarePlan resource

use super::Resource;
use crate::r5::codes::{CarePlanIntent, RequestStatus};
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative, Period,
    Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Describes the intention of how one or more practitioners intend to deliver care for a
/// particular patient, group or community for a period of time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarePlan {
    /// Resource type - always "CarePlan"
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
    pub replaces: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Vec<Reference>>,

    pub status: RequestStatus,

    pub intent: CarePlanIntent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Who the care plan is for
    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custodian: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_team: Option<Vec<Reference>>,

    /// Health issues this plan addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_info: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Vec<CarePlanActivity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "CarePlan".to_string()
}

/// Action to occur or has occurred as part of plan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarePlanActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_activity: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_activity_reference: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl CarePlan {
    pub fn new(status: RequestStatus, intent: CarePlanIntent, subject: Reference) -> Self {
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
            replaces: None,
            part_of: None,
            status,
            intent,
            category: None,
            title: None,
            description: None,
            subject,
            encounter: None,
            period: None,
            created: None,
            custodian: None,
            contributor: None,
            care_team: None,
            addresses: None,
            supporting_info: None,
            goal: None,
            activity: None,
            note: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(CarePlan);

impl Validate for CarePlan {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "CarePlan");
        ctx.each("identifier", &self.identifier);
        ctx.uris("instantiatesCanonical", &self.instantiates_canonical);
        ctx.uris("instantiatesUri", &self.instantiates_uri);
        ctx.each("basedOn", &self.based_on);
        ctx.each("replaces", &self.replaces);
        ctx.each("partOf", &self.part_of);
        ctx.each("category", &self.category);
        ctx.field("subject", &self.subject);
        ctx.optional("encounter", &self.encounter);
        ctx.optional("period", &self.period);
        ctx.date_time("created", self.created.as_deref());
        ctx.optional("custodian", &self.custodian);
        ctx.each("contributor", &self.contributor);
        ctx.each("careTeam", &self.care_team);
        ctx.each("addresses", &self.addresses);
        ctx.each("supportingInfo", &self.supporting_info);
        ctx.each("goal", &self.goal);
        ctx.each("activity", &self.activity);
        ctx.each("note", &self.note);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CarePlanActivity {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("performedActivity", &self.performed_activity);
        ctx.each("progress", &self.progress);
        ctx.optional("plannedActivityReference", &self.planned_activity_reference);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_care_plan_parse() {
        let plan = CarePlan::from_value(json!({
            "resourceType": "CarePlan",
            "status": "active",
            "intent": "plan",
            "subject": {"reference": "Patient/example"},
            "period": {"end": "2017-06-01"},
            "activity": [{
                "plannedActivityReference": {"reference": "ServiceRequest/walk"},
                "progress": [{"text": "Walking 2km a day"}]
            }]
        }))
        .unwrap();

        assert_eq!(plan.status, RequestStatus::Active);
        assert_eq!(plan.intent, CarePlanIntent::Plan);
        assert!(plan.validate().valid);
    }

    #[test]
    fn test_blank_progress_note() {
        let mut plan = CarePlan::new(
            RequestStatus::Draft,
            CarePlanIntent::Proposal,
            Reference::new("Patient/example"),
        );
        plan.activity = Some(vec![CarePlanActivity {
            progress: Some(vec![Annotation::new("")]),
            ..Default::default()
        }]);

        let outcome = plan.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("CarePlan.activity[0].progress[0].text")
        );
    }
}
