//! FHIR DiagnosticReport resource

use super::Resource;
use crate::r5::codes::DiagnosticReportStatus;
use crate::r5::datatypes::{
    Annotation, Attachment, CodeableConcept, Extension, Identifier, Meta, Narrative, Period,
    Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The findings and interpretation of diagnostic tests performed on patients, groups of patients,
/// products, substances, devices, and locations, and/or specimens derived from these
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    /// Resource type - always "DiagnosticReport"
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
    pub based_on: Option<Vec<Reference>>,

    pub status: DiagnosticReportStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    /// Name/Code for this diagnostic report
    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Clinically relevant time/time-period for the results that are included in the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_interpreter: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen: Option<Vec<Reference>>,

    /// Observations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub study: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_info: Option<Vec<DiagnosticReportSupportingInfo>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<DiagnosticReportMedia>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion_code: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub presented_form: Option<Vec<Attachment>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "DiagnosticReport".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReportSupportingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(rename = "type")]
    pub type_: CodeableConcept,

    pub reference: Reference,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReportMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    pub link: Reference,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl DiagnosticReport {
    pub fn new(status: DiagnosticReportStatus, code: CodeableConcept) -> Self {
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
            based_on: None,
            status,
            category: None,
            code,
            subject: None,
            encounter: None,
            effective_date_time: None,
            effective_period: None,
            issued: None,
            performer: None,
            results_interpreter: None,
            specimen: None,
            result: None,
            note: None,
            study: None,
            supporting_info: None,
            media: None,
            composition: None,
            conclusion: None,
            conclusion_code: None,
            presented_form: None,
            additional: HashMap::new(),
        }
    }
}

impl DiagnosticReportSupportingInfo {
    pub fn new(type_: CodeableConcept, reference: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            type_,
            reference,
            additional: HashMap::new(),
        }
    }
}

impl DiagnosticReportMedia {
    pub fn new(link: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            comment: None,
            link,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(DiagnosticReport);

impl Validate for DiagnosticReport {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "DiagnosticReport");
        ctx.each("identifier", &self.identifier);
        ctx.each("basedOn", &self.based_on);
        ctx.each("category", &self.category);
        ctx.field("code", &self.code);
        ctx.optional("subject", &self.subject);
        ctx.optional("encounter", &self.encounter);
        ctx.choice(
            "effective[x]",
            &[
                ("effectiveDateTime", self.effective_date_time.is_some()),
                ("effectivePeriod", self.effective_period.is_some()),
            ],
        );
        ctx.date_time("effectiveDateTime", self.effective_date_time.as_deref());
        ctx.optional("effectivePeriod", &self.effective_period);
        ctx.instant("issued", self.issued.as_deref());
        ctx.each("performer", &self.performer);
        ctx.each("resultsInterpreter", &self.results_interpreter);
        ctx.each("specimen", &self.specimen);
        ctx.each("result", &self.result);
        ctx.each("note", &self.note);
        ctx.each("study", &self.study);
        ctx.each("supportingInfo", &self.supporting_info);
        ctx.each("media", &self.media);
        ctx.optional("composition", &self.composition);
        ctx.each("conclusionCode", &self.conclusion_code);
        ctx.each("presentedForm", &self.presented_form);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DiagnosticReportSupportingInfo {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("type", &self.type_);
        ctx.field("reference", &self.reference);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DiagnosticReportMedia {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("link", &self.link);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_report_parse() {
        let report = DiagnosticReport::from_value(json!({
            "resourceType": "DiagnosticReport",
            "status": "final",
            "code": {"coding": [{"system": "http://loinc.org", "code": "58410-2"}]},
            "subject": {"reference": "Patient/pat2"},
            "effectiveDateTime": "2011-03-04T08:30:00+11:00",
            "issued": "2011-03-04T11:45:33+11:00",
            "result": [{"reference": "Observation/r1"}, {"reference": "Observation/r2"}],
            "media": [{"link": {"reference": "DocumentReference/1.2.840.11361907579238403408700.3.1.04.19970327150033"}}]
        }))
        .unwrap();

        assert_eq!(report.status, DiagnosticReportStatus::Final);
        assert_eq!(report.result.as_ref().map(Vec::len), Some(2));
        assert!(report.validate().valid);
    }

    #[test]
    fn test_issued_must_be_instant() {
        let mut report = DiagnosticReport::new(
            DiagnosticReportStatus::Preliminary,
            CodeableConcept::from_text("CBC"),
        );
        report.issued = Some("2011-03-04".to_string());

        let outcome = report.validate();
        assert_eq!(outcome.issues[0].location.as_deref(), Some("DiagnosticReport.issued"));
    }
}
