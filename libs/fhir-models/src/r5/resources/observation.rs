//! FHIR Observation resource

use super::Resource;
use crate::r5::codes::{ObservationStatus, TriggeredByType};
use crate::r5::datatypes::{
    Annotation, Attachment, CodeableConcept, Extension, Identifier, Meta, Narrative, Period,
    Quantity, Range, Ratio, Reference, SampledData, SimpleQuantity, Timing,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Picks the populated `value[x]` variant of an observation or component
macro_rules! populated_value {
    ($this:expr) => {
        $this
            .value_quantity
            .as_ref()
            .map(ObservationValue::Quantity)
            .or_else(|| $this.value_codeable_concept.as_ref().map(ObservationValue::CodeableConcept))
            .or_else(|| $this.value_string.as_deref().map(ObservationValue::String))
            .or_else(|| $this.value_boolean.map(ObservationValue::Boolean))
            .or_else(|| $this.value_integer.map(ObservationValue::Integer))
            .or_else(|| $this.value_range.as_ref().map(ObservationValue::Range))
            .or_else(|| $this.value_ratio.as_ref().map(ObservationValue::Ratio))
            .or_else(|| $this.value_sampled_data.as_ref().map(ObservationValue::SampledData))
            .or_else(|| $this.value_time.as_deref().map(ObservationValue::Time))
            .or_else(|| $this.value_date_time.as_deref().map(ObservationValue::DateTime))
            .or_else(|| $this.value_period.as_ref().map(ObservationValue::Period))
            .or_else(|| $this.value_attachment.as_ref().map(ObservationValue::Attachment))
            .or_else(|| $this.value_reference.as_ref().map(ObservationValue::Reference))
    };
}

/// Measurements and simple assertions made about a patient, device or other subject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Resource type - always "Observation"
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

    /// Business Identifier for observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// Instantiates FHIR ObservationDefinition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instantiates_canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instantiates_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<Vec<ObservationTriggeredBy>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Vec<Reference>>,

    /// registered | preliminary | final | amended +
    pub status: ObservationStatus,

    /// Classification of  type of observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    /// Type of observation (code / type)
    pub code: CodeableConcept,

    /// Who and/or what the observation is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Clinically relevant time/time-period for observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_timing: Option<Timing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_instant: Option<String>,

    /// Date/Time this version was made available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Reference>>,

    /// Actual result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ratio: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_sampled_data: Option<SampledData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,

    /// Why the result is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_absent_reason: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_structure: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Reference>,

    /// Provides guide for interpretation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<Vec<ObservationReferenceRange>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_member: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Vec<Reference>>,

    /// Component results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Vec<ObservationComponent>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Observation".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservationTriggeredBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub observation: Reference,

    #[serde(rename = "type")]
    pub type_: TriggeredByType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservationReferenceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_value: Option<CodeableConcept>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Range>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservationComponent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ratio: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_sampled_data: Option<SampledData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_absent_reason: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<Vec<ObservationReferenceRange>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Observation {
    pub fn new(status: ObservationStatus, code: CodeableConcept) -> Self {
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
            instantiates_reference: None,
            based_on: None,
            triggered_by: None,
            part_of: None,
            status,
            category: None,
            code,
            subject: None,
            focus: None,
            encounter: None,
            effective_date_time: None,
            effective_period: None,
            effective_timing: None,
            effective_instant: None,
            issued: None,
            performer: None,
            value_quantity: None,
            value_codeable_concept: None,
            value_string: None,
            value_boolean: None,
            value_integer: None,
            value_range: None,
            value_ratio: None,
            value_sampled_data: None,
            value_time: None,
            value_date_time: None,
            value_period: None,
            value_attachment: None,
            value_reference: None,
            data_absent_reason: None,
            interpretation: None,
            note: None,
            body_site: None,
            body_structure: None,
            method: None,
            specimen: None,
            device: None,
            reference_range: None,
            has_member: None,
            derived_from: None,
            component: None,
            additional: HashMap::new(),
        }
    }

    /// The populated `value[x]` variant, if any
    pub fn value(&self) -> Option<ObservationValue<'_>> {
        populated_value!(self)
    }

    /// Component with a coding matching `system` and `code`
    pub fn component_by_code(&self, system: &str, code: &str) -> Option<&ObservationComponent> {
        self.component
            .iter()
            .flatten()
            .find(|component| component.code.has_coding(system, code))
    }

    fn component_repeats_code(&self) -> bool {
        let codings = self.code.coding.as_deref().unwrap_or_default();
        self.component.iter().flatten().any(|component| {
            codings.iter().any(|coding| match (&coding.system, &coding.code) {
                (Some(system), Some(code)) => component.code.has_coding(system, code),
                _ => false,
            })
        })
    }
}

impl ObservationTriggeredBy {
    pub fn new(observation: Reference, type_: TriggeredByType) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            observation,
            type_,
            reason: None,
            additional: HashMap::new(),
        }
    }
}

impl ObservationComponent {
    pub fn new(code: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code,
            value_quantity: None,
            value_codeable_concept: None,
            value_string: None,
            value_boolean: None,
            value_integer: None,
            value_range: None,
            value_ratio: None,
            value_sampled_data: None,
            value_time: None,
            value_date_time: None,
            value_period: None,
            value_attachment: None,
            value_reference: None,
            data_absent_reason: None,
            interpretation: None,
            reference_range: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Observation);

impl Validate for Observation {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Observation");
        ctx.each("identifier", &self.identifier);
        ctx.choice(
            "instantiates[x]",
            &[
                ("instantiatesCanonical", self.instantiates_canonical.is_some()),
                ("instantiatesReference", self.instantiates_reference.is_some()),
            ],
        );
        ctx.uri("instantiatesCanonical", self.instantiates_canonical.as_deref());
        ctx.optional("instantiatesReference", &self.instantiates_reference);
        ctx.each("basedOn", &self.based_on);
        ctx.each("triggeredBy", &self.triggered_by);
        ctx.each("partOf", &self.part_of);
        ctx.each("category", &self.category);
        ctx.field("code", &self.code);
        ctx.optional("subject", &self.subject);
        ctx.each("focus", &self.focus);
        ctx.optional("encounter", &self.encounter);
        ctx.choice(
            "effective[x]",
            &[
                ("effectiveDateTime", self.effective_date_time.is_some()),
                ("effectivePeriod", self.effective_period.is_some()),
                ("effectiveTiming", self.effective_timing.is_some()),
                ("effectiveInstant", self.effective_instant.is_some()),
            ],
        );
        ctx.date_time("effectiveDateTime", self.effective_date_time.as_deref());
        ctx.optional("effectivePeriod", &self.effective_period);
        ctx.optional("effectiveTiming", &self.effective_timing);
        ctx.instant("effectiveInstant", self.effective_instant.as_deref());
        ctx.instant("issued", self.issued.as_deref());
        ctx.each("performer", &self.performer);
        ctx.choice(
            "value[x]",
            &[
                ("valueQuantity", self.value_quantity.is_some()),
                ("valueCodeableConcept", self.value_codeable_concept.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueInteger", self.value_integer.is_some()),
                ("valueRange", self.value_range.is_some()),
                ("valueRatio", self.value_ratio.is_some()),
                ("valueSampledData", self.value_sampled_data.is_some()),
                ("valueTime", self.value_time.is_some()),
                ("valueDateTime", self.value_date_time.is_some()),
                ("valuePeriod", self.value_period.is_some()),
                ("valueAttachment", self.value_attachment.is_some()),
                ("valueReference", self.value_reference.is_some()),
            ],
        );
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueCodeableConcept", &self.value_codeable_concept);
        ctx.optional("valueRange", &self.value_range);
        ctx.optional("valueRatio", &self.value_ratio);
        ctx.optional("valueSampledData", &self.value_sampled_data);
        ctx.time("valueTime", self.value_time.as_deref());
        ctx.date_time("valueDateTime", self.value_date_time.as_deref());
        ctx.optional("valuePeriod", &self.value_period);
        ctx.optional("valueAttachment", &self.value_attachment);
        ctx.optional("valueReference", &self.value_reference);
        ctx.optional("dataAbsentReason", &self.data_absent_reason);
        ctx.each("interpretation", &self.interpretation);
        ctx.each("note", &self.note);
        ctx.optional("bodySite", &self.body_site);
        ctx.optional("bodyStructure", &self.body_structure);
        ctx.optional("method", &self.method);
        ctx.optional("specimen", &self.specimen);
        ctx.optional("device", &self.device);
        ctx.each("referenceRange", &self.reference_range);
        ctx.each("hasMember", &self.has_member);
        ctx.each("derivedFrom", &self.derived_from);
        ctx.each("component", &self.component);

        ctx.invariant(
            "obs-6",
            self.data_absent_reason.is_none() || self.value().is_none(),
            "dataAbsentReason SHALL only be present if Observation.value[x] is not present",
        );
        ctx.invariant(
            "obs-7",
            self.value().is_none() || !self.component_repeats_code(),
            "If Observation.component.code is the same as Observation.code, then Observation.value SHALL NOT be present",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ObservationTriggeredBy {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("observation", &self.observation);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ObservationReferenceRange {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("low", &self.low);
        ctx.optional("high", &self.high);
        ctx.optional("normalValue", &self.normal_value);
        ctx.optional("type", &self.type_);
        ctx.each("appliesTo", &self.applies_to);
        ctx.optional("age", &self.age);

        ctx.invariant(
            "obs-3",
            self.low.is_some() || self.high.is_some() || self.text.is_some(),
            "Must have at least a low or a high or text",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ObservationComponent {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("code", &self.code);
        ctx.choice(
            "value[x]",
            &[
                ("valueQuantity", self.value_quantity.is_some()),
                ("valueCodeableConcept", self.value_codeable_concept.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueInteger", self.value_integer.is_some()),
                ("valueRange", self.value_range.is_some()),
                ("valueRatio", self.value_ratio.is_some()),
                ("valueSampledData", self.value_sampled_data.is_some()),
                ("valueTime", self.value_time.is_some()),
                ("valueDateTime", self.value_date_time.is_some()),
                ("valuePeriod", self.value_period.is_some()),
                ("valueAttachment", self.value_attachment.is_some()),
                ("valueReference", self.value_reference.is_some()),
            ],
        );
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueCodeableConcept", &self.value_codeable_concept);
        ctx.optional("valueRange", &self.value_range);
        ctx.optional("valueRatio", &self.value_ratio);
        ctx.optional("valueSampledData", &self.value_sampled_data);
        ctx.time("valueTime", self.value_time.as_deref());
        ctx.date_time("valueDateTime", self.value_date_time.as_deref());
        ctx.optional("valuePeriod", &self.value_period);
        ctx.optional("valueAttachment", &self.value_attachment);
        ctx.optional("valueReference", &self.value_reference);
        ctx.optional("dataAbsentReason", &self.data_absent_reason);
        ctx.each("interpretation", &self.interpretation);
        ctx.each("referenceRange", &self.reference_range);

        ctx.invariant(
            "obs-6",
            self.data_absent_reason.is_none() || self.value().is_none(),
            "dataAbsentReason SHALL only be present if Observation.value[x] is not present",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Borrowed view of whichever `value[x]` variant is populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObservationValue<'a> {
    Quantity(&'a Quantity),
    CodeableConcept(&'a CodeableConcept),
    String(&'a str),
    Boolean(bool),
    Integer(i32),
    Range(&'a Range),
    Ratio(&'a Ratio),
    SampledData(&'a SampledData),
    Time(&'a str),
    DateTime(&'a str),
    Period(&'a Period),
    Attachment(&'a Attachment),
    Reference(&'a Reference),
}

impl ObservationValue<'_> {
    /// The JSON property name of the variant, e.g. `valueQuantity`
    pub fn element_name(&self) -> &'static str {
        match self {
            ObservationValue::Quantity(_) => "valueQuantity",
            ObservationValue::CodeableConcept(_) => "valueCodeableConcept",
            ObservationValue::String(_) => "valueString",
            ObservationValue::Boolean(_) => "valueBoolean",
            ObservationValue::Integer(_) => "valueInteger",
            ObservationValue::Range(_) => "valueRange",
            ObservationValue::Ratio(_) => "valueRatio",
            ObservationValue::SampledData(_) => "valueSampledData",
            ObservationValue::Time(_) => "valueTime",
            ObservationValue::DateTime(_) => "valueDateTime",
            ObservationValue::Period(_) => "valuePeriod",
            ObservationValue::Attachment(_) => "valueAttachment",
            ObservationValue::Reference(_) => "valueReference",
        }
    }
}

impl ObservationComponent {
    pub fn value(&self) -> Option<ObservationValue<'_>> {
        populated_value!(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::{IssueType, ObservationStatus};
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    const LOINC: &str = "http://loinc.org";

    fn blood_pressure() -> serde_json::Value {
        json!({
            "resourceType": "Observation",
            "id": "blood-pressure",
            "status": "final",
            "category": [{"coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/observation-category",
                "code": "vital-signs"
            }]}],
            "code": {"coding": [{"system": LOINC, "code": "85354-9"}]},
            "subject": {"reference": "Patient/example"},
            "effectiveDateTime": "2012-09-17",
            "component": [
                {
                    "code": {"coding": [{"system": LOINC, "code": "8480-6"}]},
                    "valueQuantity": {"value": 107, "unit": "mmHg", "system": "http://unitsofmeasure.org", "code": "mm[Hg]"}
                },
                {
                    "code": {"coding": [{"system": LOINC, "code": "8462-4"}]},
                    "valueQuantity": {"value": 60, "unit": "mmHg", "system": "http://unitsofmeasure.org", "code": "mm[Hg]"}
                }
            ]
        })
    }

    #[test]
    fn test_parse_blood_pressure() {
        let observation = Observation::from_value(blood_pressure()).unwrap();
        assert_eq!(observation.status, ObservationStatus::Final);
        assert!(observation.value().is_none());

        let systolic = observation.component_by_code(LOINC, "8480-6").unwrap();
        match systolic.value() {
            Some(ObservationValue::Quantity(quantity)) => assert_eq!(quantity.value, Some(107.0)),
            other => panic!("unexpected value: {other:?}"),
        }

        assert!(observation.validate().valid);
    }

    #[test]
    fn test_value_view() {
        let mut observation = Observation::new(
            ObservationStatus::Preliminary,
            CodeableConcept::from_text("Smoking status"),
        );
        observation.value_string = Some("never".to_string());

        let value = observation.value().unwrap();
        assert_eq!(value, ObservationValue::String("never"));
        assert_eq!(value.element_name(), "valueString");
    }

    #[test]
    fn test_two_values_rejected() {
        let observation = Observation::from_value(json!({
            "resourceType": "Observation",
            "status": "final",
            "code": {"text": "x"},
            "valueString": "a",
            "valueBoolean": true
        }))
        .unwrap();

        let outcome = observation.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Structure);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Observation.value[x]"));
    }

    #[test]
    fn test_data_absent_reason_with_value() {
        let mut observation =
            Observation::new(ObservationStatus::Final, CodeableConcept::from_text("x"));
        observation.value_boolean = Some(false);
        observation.data_absent_reason = Some(CodeableConcept::from_text("asked-unknown"));

        let outcome = observation.validate();
        assert!(!outcome.valid);
        assert!(outcome.issues[0].diagnostics.contains("obs-6"));
    }

    #[test]
    fn test_component_repeating_code_forbids_value() {
        let mut value = blood_pressure();
        value["valueString"] = json!("120/80");
        value["component"][0]["code"]["coding"][0]["code"] = json!("85354-9");

        let observation = Observation::from_value(value).unwrap();
        let outcome = observation.validate();
        assert!(outcome.issues.iter().any(|issue| issue.diagnostics.contains("obs-7")));
    }

    #[test]
    fn test_reference_range_needs_content() {
        let mut observation =
            Observation::new(ObservationStatus::Final, CodeableConcept::from_text("x"));
        observation.reference_range = Some(vec![ObservationReferenceRange::default()]);

        let outcome = observation.validate();
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Observation.referenceRange[0]"));
        assert!(outcome.issues[0].diagnostics.contains("obs-3"));
    }

    #[test]
    fn test_missing_status_is_a_parse_error() {
        let result = Observation::from_value(json!({
            "resourceType": "Observation",
            "code": {"text": "x"}
        }));
        assert!(result.is_err());
    }
}
