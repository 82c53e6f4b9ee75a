//! FHIR Specimen resource

use super::Resource;
use crate::r5::codes::{SpecimenCombined, SpecimenStatus};
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Duration, Extension, Identifier, Meta,
    Narrative, Period, Reference, SimpleQuantity,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A sample to be used for analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Specimen {
    /// Resource type - always "Specimen"
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
    pub accession_identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SpecimenStatus>,

    /// Kind of material that forms the specimen
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined: Option<SpecimenCombined>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<Vec<SpecimenFeature>>,

    /// Collection details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<SpecimenCollection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing: Option<Vec<SpecimenProcessing>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Vec<SpecimenContainer>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Specimen".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(rename = "type")]
    pub type_: CodeableConcept,

    pub description: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenCollection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fasting_status_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fasting_status_duration: Option<Duration>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenProcessing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additive: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenContainer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub device: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen_quantity: Option<SimpleQuantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Specimen {
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
            accession_identifier: None,
            status: None,
            type_: None,
            subject: None,
            received_time: None,
            parent: None,
            request: None,
            combined: None,
            role: None,
            feature: None,
            collection: None,
            processing: None,
            container: None,
            condition: None,
            note: None,
            additional: HashMap::new(),
        }
    }
}

impl Default for Specimen {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecimenFeature {
    pub fn new(type_: CodeableConcept, description: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            type_,
            description: description.into(),
            additional: HashMap::new(),
        }
    }
}

impl SpecimenContainer {
    pub fn new(device: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            device,
            location: None,
            specimen_quantity: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Specimen);

impl Validate for Specimen {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Specimen");
        ctx.each("identifier", &self.identifier);
        ctx.optional("accessionIdentifier", &self.accession_identifier);
        ctx.optional("type", &self.type_);
        ctx.optional("subject", &self.subject);
        ctx.date_time("receivedTime", self.received_time.as_deref());
        ctx.each("parent", &self.parent);
        ctx.each("request", &self.request);
        ctx.each("role", &self.role);
        ctx.each("feature", &self.feature);
        ctx.optional("collection", &self.collection);
        ctx.each("processing", &self.processing);
        ctx.each("container", &self.container);
        ctx.each("condition", &self.condition);
        ctx.each("note", &self.note);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for SpecimenFeature {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("type", &self.type_);
        ctx.required_str("description", &self.description);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for SpecimenCollection {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("collector", &self.collector);
        ctx.choice(
            "collected[x]",
            &[
                ("collectedDateTime", self.collected_date_time.is_some()),
                ("collectedPeriod", self.collected_period.is_some()),
            ],
        );
        ctx.date_time("collectedDateTime", self.collected_date_time.as_deref());
        ctx.optional("collectedPeriod", &self.collected_period);
        ctx.optional("duration", &self.duration);
        ctx.optional("quantity", &self.quantity);
        ctx.optional("method", &self.method);
        ctx.optional("device", &self.device);
        ctx.optional("procedure", &self.procedure);
        ctx.optional("bodySite", &self.body_site);
        ctx.choice(
            "fastingStatus[x]",
            &[
                ("fastingStatusCodeableConcept", self.fasting_status_codeable_concept.is_some()),
                ("fastingStatusDuration", self.fasting_status_duration.is_some()),
            ],
        );
        ctx.optional("fastingStatusCodeableConcept", &self.fasting_status_codeable_concept);
        ctx.optional("fastingStatusDuration", &self.fasting_status_duration);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for SpecimenProcessing {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("method", &self.method);
        ctx.each("additive", &self.additive);
        ctx.choice(
            "time[x]",
            &[
                ("timeDateTime", self.time_date_time.is_some()),
                ("timePeriod", self.time_period.is_some()),
            ],
        );
        ctx.date_time("timeDateTime", self.time_date_time.as_deref());
        ctx.optional("timePeriod", &self.time_period);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for SpecimenContainer {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("device", &self.device);
        ctx.optional("location", &self.location);
        ctx.optional("specimenQuantity", &self.specimen_quantity);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_specimen_parse() {
        let specimen = Specimen::from_value(json!({
            "resourceType": "Specimen",
            "status": "available",
            "type": {"text": "Venous blood specimen"},
            "subject": {"reference": "Patient/example"},
            "collection": {
                "collector": {"reference": "Practitioner/example"},
                "collectedDateTime": "2011-05-30T06:15:00Z",
                "fastingStatusCodeableConcept": {"text": "fasting"}
            },
            "container": [{"device": {"reference": "Device/tube"}}]
        }))
        .unwrap();

        assert_eq!(specimen.status, Some(SpecimenStatus::Available));
        assert!(specimen.validate().valid);
    }

    #[test]
    fn test_feature_description_required() {
        let mut specimen = Specimen::new();
        specimen.feature = Some(vec![SpecimenFeature::new(CodeableConcept::from_text("lipemic"), "")]);
        specimen.processing = Some(vec![SpecimenProcessing {
            time_date_time: Some("2011".to_string()),
            time_period: Some(Period::default()),
            ..Default::default()
        }]);

        let outcome = specimen.validate();
        assert_eq!(outcome.error_count(), 2);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Specimen.feature[0].description"));
        assert_eq!(outcome.issues[1].location.as_deref(), Some("Specimen.processing[0].time[x]"));
    }
}
