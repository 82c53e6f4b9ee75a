//! FHIR DocumentReference resource

use super::Resource;
use crate::r5::codes::{CompositionStatus, DocumentReferenceStatus};
use crate::r5::datatypes::{
    Attachment, CodeableConcept, CodeableReference, Coding, Extension, Identifier, Meta, Narrative,
    Period, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A reference to a document of any kind for any purpose
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    /// Resource type - always "DocumentReference"
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
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<Vec<Reference>>,

    pub status: DocumentReferenceStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_status: Option<CompositionStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Vec<CodeableConcept>>,

    /// Kind of document (LOINC if possible)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_site: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_setting: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// When this document reference was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attester: Option<Vec<DocumentReferenceAttester>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custodian: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<Vec<DocumentReferenceRelatesTo>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_label: Option<Vec<CodeableConcept>>,

    /// Document referenced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocumentReferenceContent>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "DocumentReference".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReferenceAttester {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub mode: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReferenceRelatesTo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub code: CodeableConcept,

    pub target: Reference,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReferenceContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Where to access the document
    pub attachment: Attachment,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<DocumentReferenceContentProfile>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReferenceContentProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_canonical: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl DocumentReference {
    pub fn new(status: DocumentReferenceStatus, content: Vec<DocumentReferenceContent>) -> Self {
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
            version: None,
            based_on: None,
            status,
            doc_status: None,
            modality: None,
            type_: None,
            category: None,
            subject: None,
            context: None,
            event: None,
            body_site: None,
            facility_type: None,
            practice_setting: None,
            period: None,
            date: None,
            author: None,
            attester: None,
            custodian: None,
            relates_to: None,
            description: None,
            security_label: None,
            content,
            additional: HashMap::new(),
        }
    }

    /// Reference a single attachment
    pub fn for_attachment(status: DocumentReferenceStatus, attachment: Attachment) -> Self {
        Self::new(status, vec![DocumentReferenceContent::new(attachment)])
    }
}

impl DocumentReferenceAttester {
    pub fn new(mode: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            mode,
            time: None,
            party: None,
            additional: HashMap::new(),
        }
    }
}

impl DocumentReferenceRelatesTo {
    pub fn new(code: CodeableConcept, target: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code,
            target,
            additional: HashMap::new(),
        }
    }
}

impl DocumentReferenceContent {
    pub fn new(attachment: Attachment) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            attachment,
            profile: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(DocumentReference);

impl Validate for DocumentReference {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "DocumentReference");
        ctx.each("identifier", &self.identifier);
        ctx.each("basedOn", &self.based_on);
        ctx.each("modality", &self.modality);
        ctx.optional("type", &self.type_);
        ctx.each("category", &self.category);
        ctx.optional("subject", &self.subject);
        ctx.each("context", &self.context);
        ctx.each("event", &self.event);
        ctx.each("bodySite", &self.body_site);
        ctx.optional("facilityType", &self.facility_type);
        ctx.optional("practiceSetting", &self.practice_setting);
        ctx.optional("period", &self.period);
        ctx.instant("date", self.date.as_deref());
        ctx.each("author", &self.author);
        ctx.each("attester", &self.attester);
        ctx.optional("custodian", &self.custodian);
        ctx.each("relatesTo", &self.relates_to);
        ctx.each("securityLabel", &self.security_label);
        ctx.required_each("content", &self.content);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DocumentReferenceAttester {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("mode", &self.mode);
        ctx.date_time("time", self.time.as_deref());
        ctx.optional("party", &self.party);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DocumentReferenceRelatesTo {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("code", &self.code);
        ctx.field("target", &self.target);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DocumentReferenceContent {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("attachment", &self.attachment);
        ctx.each("profile", &self.profile);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DocumentReferenceContentProfile {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_choice(
            "value[x]",
            &[
                ("valueCoding", self.value_coding.is_some()),
                ("valueUri", self.value_uri.is_some()),
                ("valueCanonical", self.value_canonical.is_some()),
            ],
        );
        ctx.optional("valueCoding", &self.value_coding);
        ctx.uri("valueUri", self.value_uri.as_deref());
        ctx.uri("valueCanonical", self.value_canonical.as_deref());
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
    fn test_document_reference_parse() {
        let document = DocumentReference::from_value(json!({
            "resourceType": "DocumentReference",
            "status": "current",
            "docStatus": "preliminary",
            "subject": {"reference": "Patient/xcda"},
            "date": "2005-12-24T09:43:41+11:00",
            "content": [{
                "attachment": {"contentType": "application/hl7-v3+xml", "url": "http://example.org/xds/mhd/Binary/07a6483f-732b-461e-86b6-edb665c45510"},
                "profile": [{"valueCoding": {"system": "urn:oid:1.3.6.1.4.1.19376.1.2.3", "code": "urn:ihe:pcc:handp:2008"}}]
            }]
        }))
        .unwrap();

        assert_eq!(document.doc_status, Some(CompositionStatus::Preliminary));
        assert!(document.validate().valid);
    }

    #[test]
    fn test_content_is_required() {
        let document = DocumentReference::from_value(json!({
            "resourceType": "DocumentReference",
            "status": "current"
        }))
        .unwrap();

        let outcome = document.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("DocumentReference.content"));
    }

    #[test]
    fn test_profile_value_required() {
        let mut content = DocumentReferenceContent::new(Attachment::default());
        content.profile = Some(vec![DocumentReferenceContentProfile::default()]);
        let document = DocumentReference::new(DocumentReferenceStatus::Current, vec![content]);

        let outcome = document.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("DocumentReference.content[0].profile[0].value[x]")
        );
    }

    #[test]
    fn test_for_attachment() {
        let attachment = Attachment {
            content_type: Some("application/pdf".to_string()),
            url: Some("http://example.org/report.pdf".to_string()),
            ..Default::default()
        };
        let document = DocumentReference::for_attachment(DocumentReferenceStatus::Current, attachment);
        assert_eq!(document.content.len(), 1);
        assert!(document.validate().valid);
    }
}
