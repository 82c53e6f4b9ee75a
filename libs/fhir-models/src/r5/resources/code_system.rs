//! FHIR CodeSystem resource

use super::Resource;
use crate::r5::codes::{
    CodeSystemContentMode, CodeSystemHierarchyMeaning, FilterOperator, PropertyType,
    PublicationStatus,
};
use crate::r5::datatypes::{
    CodeableConcept, Coding, ContactDetail, Extension, Identifier, Meta, Narrative, Period,
    RelatedArtifact, UsageContext,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// The CodeSystem resource is used to declare the existence of and describe a code system or code
/// system supplement and its key properties, and optionally define a part or all of its content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystem {
    /// Resource type - always "CodeSystem"
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

    /// Canonical identifier for this resource, represented as an absolute URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// Business version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_algorithm_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_algorithm_coding: Option<Coding>,

    /// Name for this resource (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// draft | active | retired | unknown
    pub status: PublicationStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_context: Option<Vec<UsageContext>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright_label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<ContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<Vec<ContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<Vec<ContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endorser: Option<Vec<ContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_artifact: Option<Vec<RelatedArtifact>>,

    /// If code comparison is case sensitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Canonical reference to the value set with entire code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    /// grouped-by | is-a | part-of | classified-with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy_meaning: Option<CodeSystemHierarchyMeaning>,

    /// If code system defines a compositional grammar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compositional: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_needed: Option<bool>,

    /// not-present | example | fragment | complete | supplement
    pub content: CodeSystemContentMode,

    /// Canonical URL of Code System this adds designations and properties to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplements: Option<String>,

    /// Total concepts in the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Filter that can be used in a value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<CodeSystemFilter>>,

    /// Additional information supplied about each concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<CodeSystemProperty>>,

    /// Concepts in the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Vec<CodeSystemConcept>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "CodeSystem".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Code that identifies the filter
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Operators that can be used with filter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operator: Vec<FilterOperator>,

    /// What to use for the value
    pub value: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Identifies the property on the concepts, and when referred to in operations
    pub code: String,

    /// Formal identifier for the property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// code | Coding | string | integer | boolean | dateTime | decimal
    #[serde(rename = "type")]
    pub type_: PropertyType,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// A concept defined by the code system. Concepts nest to express hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemConcept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Code that identifies concept
    pub code: String,

    /// Text to display to the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Additional representations for the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<Vec<CodeSystemConceptDesignation>>,

    /// Property value for the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<CodeSystemConceptProperty>>,

    /// Child Concepts (is-a/contains/categorizes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Vec<CodeSystemConcept>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemConceptDesignation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Human language of the designation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Details how this designation would be used
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_use: Option<Vec<Coding>>,

    /// The text value for this designation
    pub value: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemConceptProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Reference to CodeSystem.property.code
    pub code: String,

    /// Value of the property for this concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_decimal: Option<f64>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl CodeSystem {
    pub fn new(status: PublicationStatus, content: CodeSystemContentMode) -> Self {
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
            url: None,
            identifier: None,
            version: None,
            version_algorithm_string: None,
            version_algorithm_coding: None,
            name: None,
            title: None,
            status,
            experimental: None,
            date: None,
            publisher: None,
            contact: None,
            description: None,
            use_context: None,
            jurisdiction: None,
            purpose: None,
            copyright: None,
            copyright_label: None,
            approval_date: None,
            last_review_date: None,
            effective_period: None,
            topic: None,
            author: None,
            editor: None,
            reviewer: None,
            endorser: None,
            related_artifact: None,
            case_sensitive: None,
            value_set: None,
            hierarchy_meaning: None,
            compositional: None,
            version_needed: None,
            content,
            supplements: None,
            count: None,
            filter: None,
            property: None,
            concept: None,
            additional: HashMap::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Top-level concepts, empty when there are none
    pub fn concepts(&self) -> &[CodeSystemConcept] {
        self.concept.as_deref().unwrap_or_default()
    }

    /// Find a concept by code anywhere in the hierarchy
    pub fn find_concept(&self, code: &str) -> Option<&CodeSystemConcept> {
        find_concept_in(self.concepts(), code)
    }

    /// Every concept code, depth first
    pub fn codes(&self) -> Vec<&str> {
        let mut codes = Vec::new();
        collect_codes(self.concepts(), &mut codes);
        codes
    }
}

impl CodeSystemFilter {
    pub fn new(
        code: impl Into<String>,
        operator: Vec<FilterOperator>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code: code.into(),
            description: None,
            operator,
            value: value.into(),
            additional: HashMap::new(),
        }
    }
}

impl CodeSystemProperty {
    pub fn new(code: impl Into<String>, type_: PropertyType) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code: code.into(),
            uri: None,
            description: None,
            type_,
            additional: HashMap::new(),
        }
    }
}

impl CodeSystemConcept {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code: code.into(),
            display: None,
            definition: None,
            designation: None,
            property: None,
            concept: None,
            additional: HashMap::new(),
        }
    }

    /// Child concepts, empty when there are none
    pub fn children(&self) -> &[CodeSystemConcept] {
        self.concept.as_deref().unwrap_or_default()
    }
}

impl CodeSystemConceptDesignation {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            language: None,
            use_: None,
            additional_use: None,
            value: value.into(),
            additional: HashMap::new(),
        }
    }
}

impl CodeSystemConceptProperty {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code: code.into(),
            value_code: None,
            value_coding: None,
            value_string: None,
            value_integer: None,
            value_boolean: None,
            value_date_time: None,
            value_decimal: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(CodeSystem);

impl Validate for CodeSystem {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "CodeSystem");
        ctx.uri("url", self.url.as_deref());
        ctx.each("identifier", &self.identifier);
        ctx.choice(
            "versionAlgorithm[x]",
            &[
                ("versionAlgorithmString", self.version_algorithm_string.is_some()),
                ("versionAlgorithmCoding", self.version_algorithm_coding.is_some()),
            ],
        );
        ctx.optional("versionAlgorithmCoding", &self.version_algorithm_coding);
        ctx.date_time("date", self.date.as_deref());
        ctx.each("contact", &self.contact);
        ctx.each("useContext", &self.use_context);
        ctx.each("jurisdiction", &self.jurisdiction);
        ctx.date("approvalDate", self.approval_date.as_deref());
        ctx.date("lastReviewDate", self.last_review_date.as_deref());
        ctx.optional("effectivePeriod", &self.effective_period);
        ctx.each("topic", &self.topic);
        ctx.each("author", &self.author);
        ctx.each("editor", &self.editor);
        ctx.each("reviewer", &self.reviewer);
        ctx.each("endorser", &self.endorser);
        ctx.each("relatedArtifact", &self.related_artifact);
        ctx.uri("valueSet", self.value_set.as_deref());
        ctx.uri("supplements", self.supplements.as_deref());
        ctx.each("filter", &self.filter);
        ctx.each("property", &self.property);
        ctx.each("concept", &self.concept);

        let mut seen = HashSet::new();
        let unique_codes = self.codes().into_iter().all(|code| seen.insert(code));
        ctx.invariant(
            "csd-1",
            unique_codes,
            "Within a code system definition, all the codes SHALL be unique",
        );

        let mut seen = HashSet::new();
        let unique_properties = self
            .property
            .iter()
            .flatten()
            .all(|property| seen.insert(property.code.as_str()));
        ctx.invariant(
            "csd-2",
            unique_properties,
            "Within a code system definition, all the property codes SHALL be unique",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CodeSystemFilter {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.code("code", Some(self.code.as_str()));
        ctx.required_values("operator", &self.operator);
        ctx.required_str("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CodeSystemProperty {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.code("code", Some(self.code.as_str()));
        ctx.uri("uri", self.uri.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CodeSystemConcept {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.code("code", Some(self.code.as_str()));
        ctx.each("designation", &self.designation);
        ctx.each("property", &self.property);
        ctx.each("concept", &self.concept);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CodeSystemConceptDesignation {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.code("language", self.language.as_deref());
        ctx.optional("use", &self.use_);
        ctx.each("additionalUse", &self.additional_use);
        ctx.required_str("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for CodeSystemConceptProperty {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.code("code", Some(self.code.as_str()));
        ctx.required_choice(
            "value[x]",
            &[
                ("valueCode", self.value_code.is_some()),
                ("valueCoding", self.value_coding.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valueInteger", self.value_integer.is_some()),
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueDateTime", self.value_date_time.is_some()),
                ("valueDecimal", self.value_decimal.is_some()),
            ],
        );
        ctx.code("valueCode", self.value_code.as_deref());
        ctx.optional("valueCoding", &self.value_coding);
        ctx.date_time("valueDateTime", self.value_date_time.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

fn find_concept_in<'a>(
    concepts: &'a [CodeSystemConcept],
    code: &str,
) -> Option<&'a CodeSystemConcept> {
    concepts.iter().find_map(|concept| {
        if concept.code == code {
            Some(concept)
        } else {
            find_concept_in(concept.children(), code)
        }
    })
}

fn collect_codes<'a>(concepts: &'a [CodeSystemConcept], codes: &mut Vec<&'a str>) {
    for concept in concepts {
        codes.push(concept.code.as_str());
        collect_codes(concept.children(), codes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    fn acme() -> CodeSystem {
        CodeSystem::from_value(json!({
            "resourceType": "CodeSystem",
            "id": "example",
            "url": "http://hl7.org/fhir/CodeSystem/example",
            "name": "ACMECholCodesBlood",
            "status": "draft",
            "caseSensitive": true,
            "hierarchyMeaning": "is-a",
            "content": "complete",
            "filter": [{"code": "acme-plasma", "operator": ["="], "value": "the value of this filter is either 'true' or 'false'"}],
            "property": [{"code": "status", "type": "code"}],
            "concept": [
                {
                    "code": "chol",
                    "display": "SChol",
                    "concept": [
                        {"code": "chol-mmol", "display": "SChol (mmol/L)", "property": [{"code": "status", "valueCode": "active"}]},
                        {"code": "chol-mass", "display": "SChol (mg/L)"}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_find_concept_recursive() {
        let code_system = acme();
        assert_eq!(code_system.content, CodeSystemContentMode::Complete);
        let mass = code_system.find_concept("chol-mass").unwrap();
        assert_eq!(mass.display.as_deref(), Some("SChol (mg/L)"));
        assert!(code_system.find_concept("chol-ldl").is_none());
        assert_eq!(code_system.codes(), vec!["chol", "chol-mmol", "chol-mass"]);

        let outcome = code_system.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_content_required() {
        let result = CodeSystem::from_value(json!({"resourceType": "CodeSystem", "status": "draft"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_codes() {
        let mut code_system = acme();
        let chol = &mut code_system.concept.as_mut().unwrap()[0];
        chol.concept.as_mut().unwrap()[1].code = "chol".to_string();

        let outcome = code_system.validate();
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].diagnostics.contains("csd-1"));
        assert_eq!(outcome.issues[0].location.as_deref(), Some("CodeSystem"));
    }

    #[test]
    fn test_duplicate_property_codes() {
        let mut code_system = CodeSystem::new(PublicationStatus::Active, CodeSystemContentMode::NotPresent)
            .with_url("http://example.org/fhir/CodeSystem/props");
        code_system.property = Some(vec![
            CodeSystemProperty::new("status", PropertyType::Code),
            CodeSystemProperty::new("status", PropertyType::String),
        ]);

        let outcome = code_system.validate();
        assert!(outcome.issues.iter().any(|issue| issue.diagnostics.contains("csd-2")));
    }

    #[test]
    fn test_concept_property_value_required() {
        let mut concept = CodeSystemConcept::new("a");
        concept.property = Some(vec![CodeSystemConceptProperty::new("status")]);

        let mut code_system = CodeSystem::new(PublicationStatus::Draft, CodeSystemContentMode::Fragment);
        code_system.concept = Some(vec![concept]);

        let outcome = code_system.validate();
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("CodeSystem.concept[0].property[0].value[x]")
        );
    }

    #[test]
    fn test_filter_needs_operator() {
        let mut code_system = CodeSystem::new(PublicationStatus::Draft, CodeSystemContentMode::Example);
        code_system.filter = Some(vec![CodeSystemFilter::new("concept", Vec::new(), "a code")]);

        let outcome = code_system.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("CodeSystem.filter[0].operator"));
    }
}
