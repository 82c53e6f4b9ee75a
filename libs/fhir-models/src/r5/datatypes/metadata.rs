//! Metadata types: resource metadata, narrative and the structures used by
//! canonical resources to describe themselves

use super::{
    Address, Attachment, CodeableConcept, Coding, ContactPoint, Extension, HumanName, Period,
    Quantity, Range, Reference,
};
use crate::r5::codes::{DaysOfWeek, NarrativeStatus, PublicationStatus, RelatedArtifactType};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata about a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Version specific identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// When the resource version last changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Identifies where the resource comes from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Profiles this resource claims to conform to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    /// Security Labels applied to this resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<Coding>>,

    /// Tags applied to this resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<Coding>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Meta {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.id("versionId", self.version_id.as_deref());
        ctx.instant("lastUpdated", self.last_updated.as_deref());
        ctx.uri("source", self.source.as_deref());
        ctx.uris("profile", &self.profile);
        ctx.each("security", &self.security);
        ctx.each("tag", &self.tag);
        ctx.unknown_elements(&self.additional);
    }
}

/// Human-readable summary of the resource (essential clinical and business
/// information)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// generated | extensions | additional | empty
    pub status: NarrativeStatus,

    /// Limited xhtml content
    pub div: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Narrative {
    pub fn new(status: NarrativeStatus, div: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            status,
            div: div.into(),
            additional: HashMap::new(),
        }
    }
}

impl Validate for Narrative {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("div", &self.div);
        ctx.invariant(
            "txt-1",
            self.div.trim_start().starts_with("<div"),
            "The narrative SHALL contain only the basic html formatting elements and attributes",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Contact information
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Name of an individual to contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Contact details for individual or organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for ContactDetail {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.each("telecom", &self.telecom);
        ctx.unknown_elements(&self.additional);
    }
}

/// Contact information with purpose, organization and period
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedContactDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// The type of contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// This contact detail is handled/monitored by a specific organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for ExtendedContactDetail {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("purpose", &self.purpose);
        ctx.each("name", &self.name);
        ctx.each("telecom", &self.telecom);
        ctx.optional("address", &self.address);
        ctx.optional("organization", &self.organization);
        ctx.optional("period", &self.period);
        ctx.unknown_elements(&self.additional);
    }
}

/// Describes the context of use for a conformance or knowledge resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Type of context being specified
    pub code: Coding,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for UsageContext {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.field("code", &self.code);
        ctx.required_choice(
            "value[x]",
            &[
                ("valueCodeableConcept", self.value_codeable_concept.is_some()),
                ("valueQuantity", self.value_quantity.is_some()),
                ("valueRange", self.value_range.is_some()),
                ("valueReference", self.value_reference.is_some()),
            ],
        );
        ctx.optional("valueCodeableConcept", &self.value_codeable_concept);
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueRange", &self.value_range);
        ctx.optional("valueReference", &self.value_reference);
        ctx.unknown_elements(&self.additional);
    }
}

/// Related artifacts for a knowledge resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// documentation | justification | citation | predecessor | ...
    #[serde(rename = "type")]
    pub type_: RelatedArtifactType,

    /// Additional classifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<Vec<CodeableConcept>>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Brief description of the related artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Bibliographic citation for the artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    /// What document is being referenced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Attachment>,

    /// What artifact is being referenced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// What artifact, if not a conformance resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_status: Option<PublicationStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl RelatedArtifact {
    pub fn new(type_: RelatedArtifactType) -> Self {
        Self {
            id: None,
            extension: None,
            type_,
            classifier: None,
            label: None,
            display: None,
            citation: None,
            document: None,
            resource: None,
            resource_reference: None,
            publication_status: None,
            publication_date: None,
            additional: HashMap::new(),
        }
    }
}

impl Validate for RelatedArtifact {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.each("classifier", &self.classifier);
        ctx.optional("document", &self.document);
        ctx.uri("resource", self.resource.as_deref());
        ctx.optional("resourceReference", &self.resource_reference);
        ctx.date("publicationDate", self.publication_date.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

/// An expression that can be used to generate a value
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Natural language description of the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Short name assigned to expression for reuse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// text/cql | text/fhirpath | application/x-fhir-query | etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Expression in specified language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Where the expression is found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Expression {
    pub fn fhirpath(expression: impl Into<String>) -> Self {
        Self {
            language: Some("text/fhirpath".to_string()),
            expression: Some(expression.into()),
            ..Default::default()
        }
    }
}

impl Validate for Expression {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.code("name", self.name.as_deref());
        ctx.code("language", self.language.as_deref());
        ctx.uri("reference", self.reference.as_deref());
        ctx.invariant(
            "exp-1",
            self.expression.is_some() || self.reference.is_some(),
            "An expression or a reference must be provided",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Availability data for an item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Times the item is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_time: Option<Vec<AvailabilityAvailableTime>>,

    /// Not available during this time due to provided reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_available_time: Option<Vec<AvailabilityNotAvailableTime>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Availability {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.each("availableTime", &self.available_time);
        ctx.each("notAvailableTime", &self.not_available_time);
        ctx.unknown_elements(&self.additional);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityAvailableTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// mon | tue | wed | thu | fri | sat | sun
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<DaysOfWeek>>,

    /// Always available? i.e. 24 hour service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,

    /// Opening time of day (ignored if allDay = true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_start_time: Option<String>,

    /// Closing time of day (ignored if allDay = true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_end_time: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for AvailabilityAvailableTime {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.time("availableStartTime", self.available_start_time.as_deref());
        ctx.time("availableEndTime", self.available_end_time.as_deref());

        let has_times = self.available_start_time.is_some() || self.available_end_time.is_some();
        ctx.invariant(
            "av-1",
            self.all_day != Some(true) || !has_times,
            "Cannot include start/end times when selecting all day availability.",
        );
        ctx.unknown_elements(&self.additional);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityNotAvailableTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Reason presented to the user explaining why time not available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Service not available during this period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub during: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for AvailabilityNotAvailableTime {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("during", &self.during);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::validation::Validator;
    use serde_json::json;

    #[test]
    fn test_usage_context_requires_one_value() {
        let validator = Validator::default();
        let context = UsageContext {
            code: Coding::new(
                "http://terminology.hl7.org/CodeSystem/usage-context-type",
                "focus",
            ),
            ..Default::default()
        };

        let outcome = validator.validate_element("UsageContext", &context);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("UsageContext.value[x]")
        );

        let both = UsageContext {
            value_codeable_concept: Some(CodeableConcept::from_text("adult")),
            value_quantity: Some(Quantity::new(18.0, "a")),
            ..context
        };
        let outcome = validator.validate_element("UsageContext", &both);
        assert_eq!(outcome.issues[0].code, IssueType::Structure);
    }

    #[test]
    fn test_narrative_requires_div() {
        let narrative: Narrative = serde_json::from_value(json!({
            "status": "generated",
            "div": "<div xmlns=\"http://www.w3.org/1999/xhtml\">Hello</div>"
        }))
        .unwrap();
        assert_eq!(narrative.status, NarrativeStatus::Generated);
        assert!(Validator::default()
            .validate_element("Narrative", &narrative)
            .valid);

        let empty = Narrative::new(NarrativeStatus::Empty, "");
        let outcome = Validator::default().validate_element("Narrative", &empty);
        assert!(outcome.issues_at("Narrative.div").next().is_some());
    }

    #[test]
    fn test_narrative_div_must_be_xhtml_div() {
        let validator = Validator::default();

        let paragraph = Narrative::new(NarrativeStatus::Generated, "<p>Hello</p>");
        let outcome = validator.validate_element("Narrative", &paragraph);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Invariant);
        assert!(outcome.issues[0].diagnostics.contains("txt-1"));

        let div = Narrative::new(
            NarrativeStatus::Additional,
            "<div xmlns=\"http://www.w3.org/1999/xhtml\"><p>Hello</p></div>",
        );
        assert!(validator.validate_element("Narrative", &div).valid);
    }

    #[test]
    fn test_related_artifact_type_is_required() {
        let result: Result<RelatedArtifact, _> =
            serde_json::from_value(json!({ "label": "Ref 1" }));
        assert!(result.unwrap_err().to_string().contains("type"));

        let artifact = RelatedArtifact::new(RelatedArtifactType::DependsOn);
        assert_eq!(serde_json::to_value(&artifact).unwrap()["type"], "depends-on");
    }

    #[test]
    fn test_expression_needs_expression_or_reference() {
        let validator = Validator::default();
        assert!(validator
            .validate_element("Expression", &Expression::fhirpath("Patient.name"))
            .valid);

        let outcome = validator.validate_element("Expression", &Expression::default());
        assert!(outcome.issues[0].diagnostics.contains("exp-1"));
    }

    #[test]
    fn test_all_day_availability_rejects_times() {
        let availability = Availability {
            available_time: Some(vec![AvailabilityAvailableTime {
                all_day: Some(true),
                available_start_time: Some("08:00:00".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("Availability", &availability);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Availability.availableTime[0]")
        );
        assert!(outcome.issues[0].diagnostics.contains("av-1"));

        let office_hours = Availability {
            available_time: Some(vec![AvailabilityAvailableTime {
                days_of_week: Some(vec![DaysOfWeek::Mon, DaysOfWeek::Tue]),
                available_start_time: Some("08:00:00".to_string()),
                available_end_time: Some("17:00:00".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        assert!(Validator::default()
            .validate_element("Availability", &office_hours)
            .valid);
    }
}
