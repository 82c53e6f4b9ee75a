//! FHIR Goal resource

use super::Resource;
use crate::r5::codes::GoalLifecycleStatus;
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Duration, Extension, Identifier, Meta,
    Narrative, Quantity, Range, Ratio, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Describes the intended objective(s) for a patient, group or organization care
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Resource type - always "Goal"
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

    pub lifecycle_status: GoalLifecycleStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuous: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<CodeableConcept>,

    /// Code or text describing goal
    pub description: CodeableConcept,

    pub subject: Reference,

    /// When goal pursuit begins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<GoalTarget>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Vec<CodeableReference>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Goal".to_string()
}

/// Target outcome for the goal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_ratio: Option<Ratio>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_duration: Option<Duration>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Goal {
    pub fn new(
        lifecycle_status: GoalLifecycleStatus,
        description: CodeableConcept,
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
            lifecycle_status,
            achievement_status: None,
            category: None,
            continuous: None,
            priority: None,
            description,
            subject,
            start_date: None,
            start_codeable_concept: None,
            target: None,
            status_date: None,
            status_reason: None,
            source: None,
            addresses: None,
            note: None,
            outcome: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Goal);

impl Validate for Goal {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Goal");
        ctx.each("identifier", &self.identifier);
        ctx.optional("achievementStatus", &self.achievement_status);
        ctx.each("category", &self.category);
        ctx.optional("priority", &self.priority);
        ctx.field("description", &self.description);
        ctx.field("subject", &self.subject);
        ctx.choice(
            "start[x]",
            &[
                ("startDate", self.start_date.is_some()),
                ("startCodeableConcept", self.start_codeable_concept.is_some()),
            ],
        );
        ctx.date("startDate", self.start_date.as_deref());
        ctx.optional("startCodeableConcept", &self.start_codeable_concept);
        ctx.each("target", &self.target);
        ctx.date("statusDate", self.status_date.as_deref());
        ctx.optional("source", &self.source);
        ctx.each("addresses", &self.addresses);
        ctx.each("note", &self.note);
        ctx.each("outcome", &self.outcome);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for GoalTarget {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("measure", &self.measure);
        ctx.choice(
            "detail[x]",
            &[
                ("detailQuantity", self.detail_quantity.is_some()),
                ("detailRange", self.detail_range.is_some()),
                ("detailCodeableConcept", self.detail_codeable_concept.is_some()),
                ("detailString", self.detail_string.is_some()),
                ("detailBoolean", self.detail_boolean.is_some()),
                ("detailInteger", self.detail_integer.is_some()),
                ("detailRatio", self.detail_ratio.is_some()),
            ],
        );
        ctx.optional("detailQuantity", &self.detail_quantity);
        ctx.optional("detailRange", &self.detail_range);
        ctx.optional("detailCodeableConcept", &self.detail_codeable_concept);
        ctx.optional("detailRatio", &self.detail_ratio);
        ctx.choice(
            "due[x]",
            &[
                ("dueDate", self.due_date.is_some()),
                ("dueDuration", self.due_duration.is_some()),
            ],
        );
        ctx.date("dueDate", self.due_date.as_deref());
        ctx.optional("dueDuration", &self.due_duration);

        let has_detail = self.detail_quantity.is_some()
            || self.detail_range.is_some()
            || self.detail_codeable_concept.is_some()
            || self.detail_string.is_some()
            || self.detail_boolean.is_some()
            || self.detail_integer.is_some()
            || self.detail_ratio.is_some();
        ctx.invariant(
            "gol-1",
            !has_detail || self.measure.is_some(),
            "Goal.target.measure is required if Goal.target.detail is populated",
        );
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_goal_parse() {
        let goal = Goal::from_value(json!({
            "resourceType": "Goal",
            "lifecycleStatus": "on-hold",
            "description": {"text": "Target weight is 160 to 180 lbs."},
            "subject": {"reference": "Patient/example"},
            "startDate": "2015-04-05",
            "target": [{
                "measure": {"coding": [{"system": "http://loinc.org", "code": "3141-9"}]},
                "detailRange": {
                    "low": {"value": 160, "unit": "lbs", "system": "http://unitsofmeasure.org", "code": "[lb_av]"},
                    "high": {"value": 180, "unit": "lbs", "system": "http://unitsofmeasure.org", "code": "[lb_av]"}
                },
                "dueDate": "2016-04-05"
            }]
        }))
        .unwrap();

        assert_eq!(goal.lifecycle_status, GoalLifecycleStatus::OnHold);
        assert!(goal.validate().valid);
    }

    #[test]
    fn test_detail_without_measure() {
        let mut goal = Goal::new(
            GoalLifecycleStatus::Active,
            CodeableConcept::from_text("Stop smoking"),
            Reference::new("Patient/example"),
        );
        goal.target = Some(vec![GoalTarget {
            detail_boolean: Some(true),
            ..Default::default()
        }]);

        let outcome = goal.validate();
        assert!(!outcome.valid);
        assert!(outcome.issues[0].diagnostics.contains("gol-1"));
    }
}
