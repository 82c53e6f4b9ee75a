//! FHIR ValueSet resource

use super::Resource;
use crate::r5::codes::{FilterOperator, PublicationStatus};
use crate::r5::datatypes::{
    CodeableConcept, Coding, ContactDetail, Extension, Identifier, Meta, Narrative, Period,
    RelatedArtifact, UsageContext,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A ValueSet resource instance specifies a set of codes drawn from one or more code systems,
/// intended for use in a particular context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSet {
    /// Resource type - always "ValueSet"
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

    /// Indicates whether or not any change to the content logical definition may occur
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,

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

    /// Content logical definition of the value set (CLD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose: Option<ValueSetCompose>,

    /// Used when the value set is "expanded"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<ValueSetExpansion>,

    /// Description of the semantic space the Value Set Expansion is intended to cover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ValueSetScope>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "ValueSet".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetCompose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Fixed date for references with no specified version (transitive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_date: Option<String>,

    /// Whether inactive codes are in the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,

    /// Include one or more codes from a code system or other value set(s)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<ValueSetComposeInclude>,

    /// Explicitly exclude codes from a code system or other value sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<ValueSetComposeInclude>>,

    /// Property to return if client doesn't override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<String>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Codes from a code system or other value set(s). Shared by `include` and `exclude`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetComposeInclude {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// The system the codes come from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// A concept defined in the system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Vec<ValueSetComposeIncludeConcept>>,

    /// Select codes/concepts by their properties (including relationships)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<ValueSetComposeIncludeFilter>>,

    /// Select the contents included in this value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetComposeIncludeConcept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Code or expression from system
    pub code: String,

    /// Text to display for this code for this value set in this valueset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Additional representations for this concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<Vec<ValueSetConceptDesignation>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Additional representations for a concept, used by compose concepts and expansion entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetConceptDesignation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Human language of the designation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Types of uses of designations
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
pub struct ValueSetComposeIncludeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// A property/filter defined by the code system
    pub property: String,

    /// = | is-a | descendent-of | is-not-a | regex | in | not-in | generalizes | child-of | descendent-leaf | exists
    pub op: FilterOperator,

    /// Code from the system, or regex criteria, or boolean value for exists
    pub value: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Identifies the value set expansion (business identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Opaque urls for paging through expansion results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Time ValueSet expansion happened
    pub timestamp: String,

    /// Total number of codes in the expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i32>,

    /// Offset at which this resource starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,

    /// Parameter that controlled the expansion process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<ValueSetExpansionParameter>>,

    /// Additional information supplied about each concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<ValueSetExpansionProperty>>,

    /// Codes in the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<ValueSetExpansionContains>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansionParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Name as assigned by the client or server
    pub name: String,

    /// Value of the named parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_decimal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansionProperty {
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
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// A code in the expansion. Entries nest to express hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansionContains {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// System value for the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// If user cannot select this entry
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    /// If concept is inactive in the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Code - if blank, this is not a selectable code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// User display for the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<Vec<ValueSetConceptDesignation>>,

    /// Property value for the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<ValueSetExpansionContainsProperty>>,

    /// Codes contained under this entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<ValueSetExpansionContains>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetExpansionContainsProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Reference to ValueSet.expansion.property.code
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

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Criteria describing which concepts or codes should be included and why
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusion_criteria: Option<String>,

    /// Criteria describing which concepts or codes should be excluded and why
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion_criteria: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ValueSet {
    pub fn new(status: PublicationStatus) -> Self {
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
            immutable: None,
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
            compose: None,
            expansion: None,
            scope: None,
            additional: HashMap::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether the expansion lists `code` from `system`, at any depth
    pub fn contains_code(&self, system: &str, code: &str) -> bool {
        self.expansion
            .as_ref()
            .is_some_and(|expansion| contains_in(expansion.entries(), system, code))
    }

    /// Systems referenced by `compose.include`
    pub fn included_systems(&self) -> Vec<&str> {
        self.compose
            .iter()
            .flat_map(|compose| compose.include.iter())
            .filter_map(|include| include.system.as_deref())
            .collect()
    }
}

impl ValueSetCompose {
    pub fn new(include: Vec<ValueSetComposeInclude>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            locked_date: None,
            inactive: None,
            include,
            exclude: None,
            property: None,
            additional: HashMap::new(),
        }
    }
}

impl ValueSetComposeIncludeConcept {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code: code.into(),
            display: None,
            designation: None,
            additional: HashMap::new(),
        }
    }
}

impl ValueSetConceptDesignation {
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

impl ValueSetComposeIncludeFilter {
    pub fn new(property: impl Into<String>, op: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            property: property.into(),
            op,
            value: value.into(),
            additional: HashMap::new(),
        }
    }
}

impl ValueSetExpansion {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            identifier: None,
            next: None,
            timestamp: timestamp.into(),
            total: None,
            offset: None,
            parameter: None,
            property: None,
            contains: None,
            additional: HashMap::new(),
        }
    }

    /// Top-level entries, empty when there are none
    pub fn entries(&self) -> &[ValueSetExpansionContains] {
        self.contains.as_deref().unwrap_or_default()
    }
}

impl ValueSetExpansionParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            name: name.into(),
            value_string: None,
            value_boolean: None,
            value_integer: None,
            value_decimal: None,
            value_uri: None,
            value_code: None,
            value_date_time: None,
            additional: HashMap::new(),
        }
    }
}

impl ValueSetExpansionProperty {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            code: code.into(),
            uri: None,
            additional: HashMap::new(),
        }
    }
}

impl ValueSetExpansionContains {
    /// Nested entries, empty when there are none
    pub fn children(&self) -> &[ValueSetExpansionContains] {
        self.contains.as_deref().unwrap_or_default()
    }
}

impl ValueSetExpansionContainsProperty {
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

impl_fhir_resource!(ValueSet);

impl Validate for ValueSet {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "ValueSet");
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
        ctx.optional("compose", &self.compose);
        ctx.optional("expansion", &self.expansion);
        ctx.optional("scope", &self.scope);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetCompose {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.date("lockedDate", self.locked_date.as_deref());
        ctx.required_each("include", &self.include);
        ctx.each("exclude", &self.exclude);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetComposeInclude {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.uri("system", self.system.as_deref());
        ctx.each("concept", &self.concept);
        ctx.each("filter", &self.filter);
        ctx.uris("valueSet", &self.value_set);

        let has_system = self.system.is_some();
        ctx.invariant(
            "vsd-1",
            self.value_set.is_some() || has_system,
            "A value set include/exclude SHALL have a value set or a system",
        );
        ctx.invariant(
            "vsd-2",
            (self.concept.is_none() && self.filter.is_none()) || has_system,
            "A value set with concepts or filters SHALL include a system",
        );
        ctx.invariant(
            "vsd-3",
            self.concept.is_none() || self.filter.is_none(),
            "Cannot have both concept and filter",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetComposeIncludeConcept {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.code("code", Some(self.code.as_str()));
        ctx.each("designation", &self.designation);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetConceptDesignation {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.code("language", self.language.as_deref());
        ctx.optional("use", &self.use_);
        ctx.each("additionalUse", &self.additional_use);
        ctx.required_str("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetComposeIncludeFilter {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("property", &self.property);
        ctx.code("property", Some(self.property.as_str()));
        ctx.required_str("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetExpansion {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.uri("identifier", self.identifier.as_deref());
        ctx.uri("next", self.next.as_deref());
        ctx.required_str("timestamp", &self.timestamp);
        ctx.date_time("timestamp", Some(self.timestamp.as_str()));
        ctx.each("parameter", &self.parameter);
        ctx.each("property", &self.property);
        ctx.each("contains", &self.contains);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetExpansionParameter {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("name", &self.name);
        ctx.choice(
            "value[x]",
            &[
                ("valueString", self.value_string.is_some()),
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueInteger", self.value_integer.is_some()),
                ("valueDecimal", self.value_decimal.is_some()),
                ("valueUri", self.value_uri.is_some()),
                ("valueCode", self.value_code.is_some()),
                ("valueDateTime", self.value_date_time.is_some()),
            ],
        );
        ctx.uri("valueUri", self.value_uri.as_deref());
        ctx.code("valueCode", self.value_code.as_deref());
        ctx.date_time("valueDateTime", self.value_date_time.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetExpansionProperty {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.code("code", Some(self.code.as_str()));
        ctx.uri("uri", self.uri.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetExpansionContains {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.uri("system", self.system.as_deref());
        ctx.code("code", self.code.as_deref());
        ctx.each("designation", &self.designation);
        ctx.each("property", &self.property);
        ctx.each("contains", &self.contains);

        ctx.invariant(
            "vsd-6",
            self.code.is_some() || self.display.is_some(),
            "SHALL have a code or a display",
        );
        ctx.invariant(
            "vsd-9",
            self.code.is_some() || self.is_abstract == Some(true),
            "Must have a code if not abstract",
        );
        ctx.invariant(
            "vsd-10",
            self.code.is_none() || self.system.is_some(),
            "Must have a system if a code is present",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for ValueSetExpansionContainsProperty {
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

impl Validate for ValueSetScope {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.unknown_elements(&self.additional);
    }
}

fn contains_in(entries: &[ValueSetExpansionContains], system: &str, code: &str) -> bool {
    entries.iter().any(|entry| {
        (entry.system.as_deref() == Some(system) && entry.code.as_deref() == Some(code))
            || contains_in(entry.children(), system, code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use crate::validation::ValidationOutcome;
    use serde_json::json;

    const LOINC: &str = "http://loinc.org";

    fn invariant_at(outcome: &ValidationOutcome, location: &str, key: &str) -> bool {
        outcome
            .issues_at(location)
            .any(|issue| issue.code == IssueType::Invariant && issue.diagnostics.contains(key))
    }

    #[test]
    fn test_parse_compose() {
        let value_set = ValueSet::from_value(json!({
            "resourceType": "ValueSet",
            "id": "example-intensional",
            "url": "http://hl7.org/fhir/ValueSet/example-intensional",
            "name": "LOINCCodesForCholesterolInSerumPlasma",
            "status": "draft",
            "compose": {
                "lockedDate": "2012-06-13",
                "include": [{
                    "system": LOINC,
                    "filter": [{"property": "parent", "op": "=", "value": "LP43571-6"}]
                }],
                "exclude": [{
                    "system": LOINC,
                    "concept": [{"code": "5932-9", "display": "Cholesterol [Presence] in Blood by Test strip"}]
                }]
            }
        }))
        .unwrap();

        let compose = value_set.compose.as_ref().unwrap();
        assert_eq!(compose.include[0].filter.as_ref().unwrap()[0].op, FilterOperator::Equal);
        assert_eq!(value_set.included_systems(), vec![LOINC]);

        let outcome = value_set.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_contains_code_in_nested_expansion() {
        let value_set = ValueSet::from_value(json!({
            "resourceType": "ValueSet",
            "status": "active",
            "expansion": {
                "timestamp": "2015-06-22T13:56:07Z",
                "total": 3,
                "parameter": [{"name": "version", "valueString": "2.50"}],
                "contains": [{
                    "abstract": true,
                    "display": "Cholesterol codes",
                    "contains": [
                        {"system": LOINC, "code": "14647-2", "display": "Cholesterol [Moles/Volume]"},
                        {"system": LOINC, "code": "2093-3", "display": "Cholesterol [Mass/Volume]"}
                    ]
                }]
            }
        }))
        .unwrap();

        assert!(value_set.contains_code(LOINC, "2093-3"));
        assert!(!value_set.contains_code(LOINC, "5932-9"));
        assert!(!value_set.contains_code("http://snomed.info/sct", "14647-2"));

        let outcome = value_set.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_abstract_serializes_with_fhir_name() {
        let entry = ValueSetExpansionContains {
            is_abstract: Some(true),
            display: Some("Grouper".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"abstract": true, "display": "Grouper"}));
    }

    #[test]
    fn test_compose_include_required() {
        let mut value_set = ValueSet::new(PublicationStatus::Draft);
        value_set.compose = Some(ValueSetCompose::new(Vec::new()));

        let outcome = value_set.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("ValueSet.compose.include"));
    }

    #[test]
    fn test_include_rules() {
        let mut concept_and_filter = ValueSetComposeInclude {
            system: Some(LOINC.to_string()),
            concept: Some(vec![ValueSetComposeIncludeConcept::new("2093-3")]),
            filter: Some(vec![ValueSetComposeIncludeFilter::new(
                "parent",
                FilterOperator::IsA,
                "LP43571-6",
            )]),
            ..Default::default()
        };
        let empty = ValueSetComposeInclude::default();
        let no_system = ValueSetComposeInclude {
            concept: Some(vec![ValueSetComposeIncludeConcept::new("2093-3")]),
            ..Default::default()
        };

        let mut value_set = ValueSet::new(PublicationStatus::Draft);
        value_set.compose = Some(ValueSetCompose::new(vec![
            concept_and_filter.clone(),
            empty,
            no_system,
        ]));

        let outcome = value_set.validate();
        assert!(invariant_at(&outcome, "ValueSet.compose.include[0]", "vsd-3"));
        assert!(invariant_at(&outcome, "ValueSet.compose.include[1]", "vsd-1"));
        assert!(invariant_at(&outcome, "ValueSet.compose.include[2]", "vsd-2"));

        concept_and_filter.filter = None;
        value_set.compose = Some(ValueSetCompose::new(vec![concept_and_filter]));
        assert!(value_set.validate().valid);
    }

    #[test]
    fn test_expansion_entry_rules() {
        let mut value_set = ValueSet::new(PublicationStatus::Active)
            .with_url("http://example.org/fhir/ValueSet/example");
        let mut expansion = ValueSetExpansion::new("2024-01-01T00:00:00Z");
        expansion.contains = Some(vec![
            ValueSetExpansionContains::default(),
            ValueSetExpansionContains {
                code: Some("2093-3".to_string()),
                ..Default::default()
            },
        ]);
        value_set.expansion = Some(expansion);

        let outcome = value_set.validate();
        assert!(invariant_at(&outcome, "ValueSet.expansion.contains[0]", "vsd-6"));
        assert!(invariant_at(&outcome, "ValueSet.expansion.contains[0]", "vsd-9"));
        assert!(invariant_at(&outcome, "ValueSet.expansion.contains[1]", "vsd-10"));
    }
}
