//! FHIR ServiceRequest resource

use super::Resource;
use crate::r5::codes::{RequestIntent, RequestPriority, RequestStatus};
use crate::r5::datatypes::{
    Annotation, CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative, Period,
    Quantity, Range, Ratio, Reference, Timing,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A record of a request for service such as diagnostic investigations, treatments, or operations
/// to be performed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    /// Resource type - always "ServiceRequest"
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
    pub requisition: Option<Identifier>,

    pub status: RequestStatus,

    pub intent: RequestIntent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<RequestPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_not_perform: Option<bool>,

    /// What is being requested/ordered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_detail: Option<Vec<ServiceRequestOrderDetail>>,

    /// Service amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_ratio: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_range: Option<Range>,

    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// When service should occur
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_timing: Option<Timing>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_needed_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_needed_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_info: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_structure: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_instruction: Option<Vec<ServiceRequestPatientInstruction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_history: Option<Vec<Reference>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "ServiceRequest".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestOrderDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_focus: Option<CodeableReference>,

    /// The parameter details for the service being requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<ServiceRequestOrderDetailParameter>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestOrderDetailParameter {
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
    pub value_ratio: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestPatientInstruction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_reference: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ServiceRequest {
    pub fn new(status: RequestStatus, intent: RequestIntent, subject: Reference) -> Self {
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
            requisition: None,
            status,
            intent,
            category: None,
            priority: None,
            do_not_perform: None,
            code: None,
            order_detail: None,
            quantity_quantity: None,
            quantity_ratio: None,
            quantity_range: None,
            subject,
            focus: None,
            encounter: None,
            occurrence_date_time: None,
            occurrence_period: None,
            occurrence_timing: None,
            as_needed_boolean: None,
            as_needed_codeable_concept: None,
            authored_on: None,
            requester: None,
            performer_type: None,
            performer: None,
            location: None,
            reason: None,
            insurance: None,
            supporting_info: None,
            specimen: None,
            body_site: None,
            body_structure: None,
            note: None,
            patient_instruction: None,
            relevant_history: None,
            additional: HashMap::new(),
        }
    }
}

impl ServiceRequestOrderDetail {
    pub fn new(parameter: Vec<ServiceRequestOrderDetailParameter>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            parameter_focus: None,
            parameter,
            additional: HashMap::new(),
        }
    }
}

impl ServiceRequestOrderDetailParameter {
    pub fn new(code: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code,
            value_quantity: None,
            value_ratio: None,
            value_range: None,
            value_boolean: None,
            value_codeable_concept: None,
            value_string: None,
            value_period: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(ServiceRequest);

impl Validate for ServiceRequest {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "ServiceRequest");
        ctx.each("identifier", &self.identifier);
        ctx.uris("instantiatesCanonical", &self.instantiates_canonical);
        ctx.uris("instantiatesUri", &self.instantiates_uri);
        ctx.each("basedOn", &self.based_on);
        ctx.each("replaces", &self.replaces);
        ctx.optional("requisition", &self.requisition);
        ctx.each("category", &self.category);
        ctx.optional("code", &self.code);
        ctx.each("orderDetail", &self.order_detail);
        ctx.choice(
            "quantity[x]",
            &[
                ("quantityQuantity", self.quantity_quantity.is_some()),
                ("quantityRatio", self.quantity_ratio.is_some()),
                ("quantityRange", self.quantity_range.is_some()),
            ],
        );
        ctx.optional("quantityQuantity", &self.quantity_quantity);
        ctx.optional("quantityRatio", &self.quantity_ratio);
        ctx.optional("quantityRange", &self.quantity_range);
        ctx.field("subject", &self.subject);
        ctx.each("focus", &self.focus);
        ctx.optional("encounter", &self.encounter);
        ctx.choice(
            "occurrence[x]",
            &[
                ("occurrenceDateTime", self.occurrence_date_time.is_some()),
                ("occurrencePeriod", self.occurrence_period.is_some()),
                ("occurrenceTiming", self.occurrence_timing.is_some()),
            ],
        );
        ctx.date_time("occurrenceDateTime", self.occurrence_date_time.as_deref());
        ctx.optional("occurrencePeriod", &self.occurrence_period);
        ctx.optional("occurrenceTiming", &self.occurrence_timing);
        ctx.choice(
            "asNeeded[x]",
            &[
                ("asNeededBoolean", self.as_needed_boolean.is_some()),
                ("asNeededCodeableConcept", self.as_needed_codeable_concept.is_some()),
            ],
        );
        ctx.optional("asNeededCodeableConcept", &self.as_needed_codeable_concept);
        ctx.date_time("authoredOn", self.authored_on.as_deref());
        ctx.optional("requester", &self.requester);
        ctx.optional("performerType", &self.performer_type);
        ctx.each("performer", &self.performer);
        ctx.each("location", &self.location);
        ctx.each("reason", &self.reason);
        ctx.each("insurance", &self.insurance);
        ctx.each("supportingInfo", &self.supporting_info);
        ctx.each("specimen", &self.specimen);
        ctx.each("bodySite", &self.body_site);
        ctx.optional("bodyStructure", &self.body_structure);
        ctx.each("note", &self.note);
        ctx.each("patientInstruction", &self.patient_instruction);
        ctx.each("relevantHistory", &self.relevant_history);

        ctx.invariant(
            "prr-1",
            self.order_detail.is_none() || self.code.is_some(),
            "orderDetail SHALL only be present if code is present",
        );
        ctx.invariant(
            "bdystr-1",
            self.body_site.is_none() || self.body_structure.is_none(),
            "bodyStructure SHALL only be present if bodySite is not present",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ServiceRequestOrderDetail {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("parameterFocus", &self.parameter_focus);
        ctx.required_each("parameter", &self.parameter);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ServiceRequestOrderDetailParameter {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("code", &self.code);
        ctx.required_choice(
            "value[x]",
            &[
                ("valueQuantity", self.value_quantity.is_some()),
                ("valueRatio", self.value_ratio.is_some()),
                ("valueRange", self.value_range.is_some()),
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueCodeableConcept", self.value_codeable_concept.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valuePeriod", self.value_period.is_some()),
            ],
        );
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueRatio", &self.value_ratio);
        ctx.optional("valueRange", &self.value_range);
        ctx.optional("valueCodeableConcept", &self.value_codeable_concept);
        ctx.optional("valuePeriod", &self.value_period);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ServiceRequestPatientInstruction {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.choice(
            "instruction[x]",
            &[
                ("instructionMarkdown", self.instruction_markdown.is_some()),
                ("instructionReference", self.instruction_reference.is_some()),
            ],
        );
        ctx.optional("instructionReference", &self.instruction_reference);
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
    fn test_service_request_parse() {
        let request = ServiceRequest::from_value(json!({
            "resourceType": "ServiceRequest",
            "status": "active",
            "intent": "original-order",
            "priority": "urgent",
            "code": {"concept": {"text": "Lipid panel"}},
            "orderDetail": [{
                "parameter": [{"code": {"text": "fasting"}, "valueBoolean": true}]
            }],
            "subject": {"reference": "Patient/example"},
            "occurrenceDateTime": "2013-05-02T16:16:00-07:00",
            "asNeededBoolean": false
        }))
        .unwrap();

        assert_eq!(request.intent, RequestIntent::OriginalOrder);
        assert_eq!(request.priority, Some(RequestPriority::Urgent));
        assert!(request.validate().valid);
    }

    #[test]
    fn test_order_detail_rules() {
        let request = ServiceRequest::from_value(json!({
            "resourceType": "ServiceRequest",
            "status": "draft",
            "intent": "proposal",
            "subject": {"reference": "Patient/example"},
            "orderDetail": [
                {"parameter": []},
                {"parameter": [{"code": {"text": "position"}}]}
            ]
        }))
        .unwrap();

        let outcome = request.validate();
        let locations: Vec<_> = outcome
            .issues
            .iter()
            .filter_map(|issue| issue.location.as_deref())
            .collect();
        assert_eq!(
            locations,
            vec![
                "ServiceRequest.orderDetail[0].parameter",
                "ServiceRequest.orderDetail[1].parameter[0].value[x]",
                "ServiceRequest",
            ]
        );
        assert_eq!(outcome.issues[2].code, IssueType::Invariant);
    }
}
