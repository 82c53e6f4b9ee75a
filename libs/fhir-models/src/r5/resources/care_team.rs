//! FHIR CareTeam resource

use super::Resource;
use crate::r5::codes::CareTeamStatus;
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, ContactPoint, Extension, Identifier, Meta,
    Narrative, Period, Reference, Timing,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The Care Team includes all the people and organizations who plan to participate in the
/// coordination and delivery of care
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTeam {
    /// Resource type - always "CareTeam"
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
    pub status: Option<CareTeamStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Members of the team
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<CareTeamParticipant>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "CareTeam".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTeamParticipant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_timing: Option<Timing>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl CareTeam {
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
            status: None,
            category: None,
            name: None,
            subject: None,
            period: None,
            participant: None,
            reason: None,
            managing_organization: None,
            telecom: None,
            note: None,
            additional: HashMap::new(),
        }
    }
}

impl Default for CareTeam {
    fn default() -> Self {
        Self::new()
    }
}

impl_fhir_resource!(CareTeam);

impl Validate for CareTeam {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "CareTeam");
        ctx.each("identifier", &self.identifier);
        ctx.each("category", &self.category);
        ctx.optional("subject", &self.subject);
        ctx.optional("period", &self.period);
        ctx.each("participant", &self.participant);
        ctx.each("reason", &self.reason);
        ctx.each("managingOrganization", &self.managing_organization);
        ctx.each("telecom", &self.telecom);
        ctx.each("note", &self.note);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CareTeamParticipant {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("role", &self.role);
        ctx.optional("member", &self.member);
        ctx.optional("onBehalfOf", &self.on_behalf_of);
        ctx.choice(
            "coverage[x]",
            &[
                ("coveragePeriod", self.coverage_period.is_some()),
                ("coverageTiming", self.coverage_timing.is_some()),
            ],
        );
        ctx.optional("coveragePeriod", &self.coverage_period);
        ctx.optional("coverageTiming", &self.coverage_timing);

        let member_is_practitioner = self.member.as_ref().is_some_and(|member| {
            member.type_.as_deref() == Some("Practitioner")
                || member
                    .type_and_id()
                    .is_some_and(|(resource_type, _)| resource_type == "Practitioner")
        });
        ctx.invariant(
            "ctm-2",
            self.on_behalf_of.is_none() || member_is_practitioner,
            "CareTeam.participant.onBehalfOf can only be populated when CareTeam.participant.member is a Practitioner",
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
    fn test_on_behalf_of_requires_practitioner() {
        let team = CareTeam::from_value(json!({
            "resourceType": "CareTeam",
            "status": "active",
            "participant": [
                {"member": {"reference": "Practitioner/example"}, "onBehalfOf": {"reference": "Organization/f001"}},
                {"member": {"reference": "RelatedPerson/anna"}, "onBehalfOf": {"reference": "Organization/f001"}}
            ]
        }))
        .unwrap();

        let outcome = team.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("CareTeam.participant[1]"));
        assert!(outcome.issues[0].diagnostics.contains("ctm-2"));
    }

    #[test]
    fn test_coverage_choice() {
        let mut team = CareTeam::new();
        team.participant = Some(vec![CareTeamParticipant {
            coverage_period: Some(Period::new(Some("2024-01-01"), None)),
            coverage_timing: Some(Timing::default()),
            ..Default::default()
        }]);

        let outcome = team.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("CareTeam.participant[0].coverage[x]")
        );
    }
}
