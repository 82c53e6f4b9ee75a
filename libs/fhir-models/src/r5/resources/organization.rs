//! FHIR Organization resource

use super::Resource;
use crate::r5::datatypes::{
    CodeableConcept, ExtendedContactDetail, Extension, Identifier, Meta, Narrative, Period,
    Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A formally or informally recognized grouping of people or organizations formed for the purpose
/// of achieving some form of collective action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Resource type - always "Organization"
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

    /// Identifies this organization across multiple systems
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Kind of organization
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<CodeableConcept>>,

    /// Name used for the organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ExtendedContactDetail>>,

    /// The organization of which this organization forms a part
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<Vec<OrganizationQualification>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Organization".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationQualification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Organization {
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
            active: None,
            type_: None,
            name: None,
            alias: None,
            description: None,
            contact: None,
            part_of: None,
            endpoint: None,
            qualification: None,
            additional: HashMap::new(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let mut organization = Self::new();
        organization.name = Some(name.into());
        organization
    }
}

impl Default for Organization {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganizationQualification {
    pub fn new(code: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            identifier: None,
            code,
            period: None,
            issuer: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Organization);

impl Validate for Organization {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Organization");
        ctx.each("identifier", &self.identifier);
        ctx.each("type", &self.type_);
        ctx.each("contact", &self.contact);
        ctx.optional("partOf", &self.part_of);
        ctx.each("endpoint", &self.endpoint);
        ctx.each("qualification", &self.qualification);

        ctx.invariant(
            "org-1",
            self.identifier.is_some() || self.name.is_some(),
            "The organization SHALL at least have a name or an identifier, and possibly more than one",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for OrganizationQualification {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("identifier", &self.identifier);
        ctx.field("code", &self.code);
        ctx.optional("period", &self.period);
        ctx.optional("issuer", &self.issuer);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;

    #[test]
    fn test_named_organization_is_valid() {
        let organization = Organization::with_name("Burgers University Medical Center");
        assert!(organization.validate().valid);

        let value = organization.to_value().unwrap();
        assert_eq!(value["resourceType"], "Organization");
        assert_eq!(value["name"], "Burgers University Medical Center");
    }

    #[test]
    fn test_anonymous_organization_breaks_org_1() {
        let outcome = Organization::new().validate();
        assert!(!outcome.valid);
        assert_eq!(outcome.issues[0].code, IssueType::Invariant);
        assert!(outcome.issues[0].diagnostics.contains("org-1"));
    }
}
