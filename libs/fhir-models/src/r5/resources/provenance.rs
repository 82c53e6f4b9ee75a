//! FHIR Provenance resource

use super::Resource;
use crate::r5::codes::ProvenanceEntityRole;
use crate::r5::datatypes::{
    CodeableConcept, CodeableReference, Extension, Meta, Narrative, Period, Reference, Signature,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Provenance of a resource is a record that describes entities and processes involved in
/// producing and delivering or otherwise influencing that resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Resource type - always "Provenance"
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

    /// Target Reference(s) (usually version specific)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<Reference>,

    /// When the activity occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_date_time: Option<String>,

    /// When the activity was recorded / updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Vec<CodeableReference>>,

    /// Activity that occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Actor involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent: Vec<ProvenanceAgent>,

    /// An entity used in this activity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Vec<ProvenanceEntity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<Signature>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Provenance".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceAgent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// How the agent participated
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Vec<CodeableConcept>>,

    /// The agent that participated in the event
    pub who: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// revision | quotation | source | instantiates | removal
    pub role: ProvenanceEntityRole,

    /// Identity of entity
    pub what: Reference,

    /// Entity is attributed to this agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Vec<ProvenanceAgent>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Provenance {
    pub fn new(target: Vec<Reference>, agent: Vec<ProvenanceAgent>) -> Self {
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
            target,
            occurred_period: None,
            occurred_date_time: None,
            recorded: None,
            policy: None,
            location: None,
            authorization: None,
            activity: None,
            based_on: None,
            patient: None,
            encounter: None,
            agent,
            entity: None,
            signature: None,
            additional: HashMap::new(),
        }
    }

    /// Entities that played `role` in the activity
    pub fn entities_with_role(
        &self,
        role: ProvenanceEntityRole,
    ) -> impl Iterator<Item = &ProvenanceEntity> {
        self.entity
            .iter()
            .flatten()
            .filter(move |entity| entity.role == role)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.as_ref().is_some_and(|signatures| !signatures.is_empty())
    }
}

impl ProvenanceAgent {
    pub fn new(who: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            type_: None,
            role: None,
            who,
            on_behalf_of: None,
            additional: HashMap::new(),
        }
    }
}

impl ProvenanceEntity {
    pub fn new(role: ProvenanceEntityRole, what: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            role,
            what,
            agent: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Provenance);

impl Validate for Provenance {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Provenance");
        ctx.required_each("target", &self.target);
        ctx.choice(
            "occurred[x]",
            &[
                ("occurredPeriod", self.occurred_period.is_some()),
                ("occurredDateTime", self.occurred_date_time.is_some()),
            ],
        );
        ctx.optional("occurredPeriod", &self.occurred_period);
        ctx.date_time("occurredDateTime", self.occurred_date_time.as_deref());
        ctx.instant("recorded", self.recorded.as_deref());
        ctx.uris("policy", &self.policy);
        ctx.optional("location", &self.location);
        ctx.each("authorization", &self.authorization);
        ctx.optional("activity", &self.activity);
        ctx.each("basedOn", &self.based_on);
        ctx.optional("patient", &self.patient);
        ctx.optional("encounter", &self.encounter);
        ctx.required_each("agent", &self.agent);
        ctx.each("entity", &self.entity);
        ctx.each("signature", &self.signature);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ProvenanceAgent {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("type", &self.type_);
        ctx.each("role", &self.role);
        ctx.field("who", &self.who);
        ctx.optional("onBehalfOf", &self.on_behalf_of);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ProvenanceEntity {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("what", &self.what);
        ctx.each("agent", &self.agent);
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
    fn test_parse_provenance() {
        let provenance = Provenance::from_value(json!({
            "resourceType": "Provenance",
            "id": "example",
            "target": [{"reference": "Procedure/example/_history/1"}],
            "occurredPeriod": {"start": "2015-06-27", "end": "2015-06-28"},
            "recorded": "2015-06-27T08:39:24+10:00",
            "policy": ["http://acme.com/fhir/Consent/25"],
            "location": {"reference": "Location/1"},
            "agent": [{
                "type": {"coding": [{"system": "http://terminology.hl7.org/CodeSystem/v3-ParticipationType", "code": "AUT"}]},
                "who": {"reference": "Practitioner/xcda-author"}
            }],
            "entity": [
                {"role": "source", "what": {"reference": "DocumentReference/example"}},
                {"role": "revision", "what": {"reference": "Procedure/example/_history/0"}}
            ]
        }))
        .unwrap();

        assert_eq!(provenance.target.len(), 1);
        assert_eq!(provenance.entities_with_role(ProvenanceEntityRole::Source).count(), 1);
        assert!(!provenance.is_signed());
        let outcome = provenance.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_target_and_agent_required() {
        let provenance = Provenance::from_value(json!({"resourceType": "Provenance"})).unwrap();
        let outcome = provenance.validate();
        assert_eq!(outcome.error_count(), 2);
        assert!(outcome.issues.iter().all(|issue| issue.code == IssueType::Required));
        assert!(outcome.issues_at("Provenance.target").next().is_some());
        assert!(outcome.issues_at("Provenance.agent").next().is_some());
    }

    #[test]
    fn test_agent_who_required() {
        let result = Provenance::from_value(json!({
            "resourceType": "Provenance",
            "target": [{"reference": "Patient/1"}],
            "agent": [{"role": [{"text": "author"}]}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_occurred_single_variant() {
        let mut provenance = Provenance::new(
            vec![Reference::new("Patient/1")],
            vec![ProvenanceAgent::new(Reference::new("Practitioner/1"))],
        );
        provenance.occurred_date_time = Some("2024-02-01".to_string());
        provenance.occurred_period = Some(Period::new(Some("2024-02-01"), None));

        let outcome = provenance.validate();
        assert_eq!(outcome.issues[0].code, IssueType::Structure);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Provenance.occurred[x]"));
    }
}
