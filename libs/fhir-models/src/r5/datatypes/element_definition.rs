//! FHIR ElementDefinition model
//!
//! Used in StructureDefinition snapshots and differentials. The open-typed
//! choice elements (`defaultValue[x]`, `fixed[x]`, `pattern[x]`,
//! `minValue[x]`, `maxValue[x]`) are kept as raw JSON in `additional` and read
//! back with [`ElementDefinition::choice_value`].

use super::{is_choice_key, Coding, Extension, UsageContext};
use crate::r5::codes::{
    AggregationMode, BindingStrength, ConstraintSeverity, DiscriminatorType, IssueType,
    PropertyRepresentation, ReferenceVersionRules, SlicingRules,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Open-typed choice elements carried in `additional`
pub const OPEN_CHOICE_PREFIXES: &[&str] =
    &["defaultValue", "fixed", "pattern", "minValue", "maxValue"];

/// FHIR ElementDefinition - defines an element in a resource or data type structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    pub path: String,

    /// Codes that define how this element is represented
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representation: Option<Vec<PropertyRepresentation>>,

    /// Name for this particular element (in a slice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,

    /// If this slice definition constrains an inherited slice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_is_constraining: Option<bool>,

    /// Name for element to display with or prompt for element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Corresponding codes in terminologies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<Coding>>,

    /// This element is sliced - slices follow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slicing: Option<ElementDefinitionSlicing>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Full formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Comments about the use of this element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Why this resource has been created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,

    /// Other names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,

    /// Minimum cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Maximum cardinality (can be "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Base definition information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<ElementDefinitionBase>,

    /// Reference to definition of content if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type and profile for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// Implicit meaning when this element is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning_when_missing: Option<String>,

    /// What the order of the elements means
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_meaning: Option<String>,

    /// Example value (as defined for type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Vec<ElementDefinitionExample>>,

    /// Max length for strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,

    /// Reference to invariant about presence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<String>>,

    /// Condition that must evaluate to true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Vec<ElementDefinitionConstraint>>,

    /// For primitives, that a value must be present - not replaced by an extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_have_value: Option<bool>,

    /// Extensions that are allowed to replace a primitive value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_alternatives: Option<Vec<String>>,

    /// If this element must be supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_support: Option<bool>,

    /// If this modifies the meaning of other elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_modifier: Option<bool>,

    /// Reason that this element is marked as a modifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_modifier_reason: Option<String>,

    /// Include when in summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_summary: Option<bool>,

    /// ValueSet details if this is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// Map element to another set of definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<ElementDefinitionMapping>>,

    /// Open-typed choice elements and anything else not declared above
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Base definition information for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Path that identifies the base element
    pub path: String,

    /// Min cardinality of the base element
    pub min: u32,

    /// Max cardinality of the base element
    pub max: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for ElementDefinitionBase {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("path", &self.path);
        ctx.required_str("max", &self.max);
        ctx.unknown_elements(&self.additional);
    }
}

/// Data type for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Data type or Resource (reference to definition)
    pub code: String,

    /// Profiles (StructureDefinition or IG) - one must apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    /// Profile (StructureDefinition or IG) on the Reference/canonical target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,

    /// contained | referenced | bundled - how aggregated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Vec<AggregationMode>>,

    /// either | independent | specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning: Option<ReferenceVersionRules>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ElementDefinitionType {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }
}

impl Validate for ElementDefinitionType {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("code", &self.code);
        ctx.uri("code", Some(self.code.as_str()));
        ctx.uris("profile", &self.profile);
        ctx.uris("targetProfile", &self.target_profile);

        let has_aggregation = self.aggregation.as_ref().is_some_and(|a| !a.is_empty());
        let is_reference = matches!(
            self.code.as_str(),
            "Reference" | "canonical" | "CodeableReference"
        );
        ctx.invariant(
            "eld-4",
            !has_aggregation || is_reference,
            "Aggregation may only be specified if one of the allowed types for the element is a reference",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Example value for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionExample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Describes the purpose of this example
    pub label: String,

    /// Value of example (`value[x]`, any type) plus any unrecognized elements
    #[serde(flatten)]
    pub value: HashMap<String, Value>,
}

impl ElementDefinitionExample {
    /// The populated `value[x]` element name and its JSON value
    pub fn value(&self) -> Option<(&str, &Value)> {
        find_choice(&self.value, "value")
    }
}

impl Validate for ElementDefinitionExample {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("label", &self.label);

        let keys = choice_keys(&self.value, "value");
        let variants: Vec<(&str, bool)> = keys.iter().map(|key| (*key, true)).collect();
        ctx.required_choice("value[x]", &variants);

        let mut unknown = self.value.clone();
        unknown.retain(|key, _| !is_choice_key(key, "value"));
        ctx.unknown_elements(&unknown);
    }
}

/// Constraint on an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Target of 'condition' reference
    pub key: String,

    /// Why this constraint is necessary or appropriate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,

    /// error | warning
    pub severity: ConstraintSeverity,

    /// Suppress warning or hint in profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress: Option<bool>,

    /// Human description of constraint
    pub human: String,

    /// FHIRPath expression of constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Reference to original source of constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ElementDefinitionConstraint {
    pub fn new(
        key: impl Into<String>,
        severity: ConstraintSeverity,
        human: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            extension: None,
            key: key.into(),
            requirements: None,
            severity,
            suppress: None,
            human: human.into(),
            expression: None,
            source: None,
            additional: HashMap::new(),
        }
    }
}

impl Validate for ElementDefinitionConstraint {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("key", &self.key);
        ctx.id("key", Some(self.key.as_str()));
        ctx.required_str("human", &self.human);
        ctx.uri("source", self.source.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

/// ValueSet binding for a coded element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// required | extensible | preferred | example
    pub strength: BindingStrength,

    /// Intended use of codes in the bound value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source of value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    /// Additional Bindings - more rules about the binding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<Vec<ElementDefinitionBindingAdditional>>,

    /// Unrecognized elements and primitive extensions (`_name`); `additional`
    /// is a FHIR element here
    #[serde(flatten)]
    pub extras: HashMap<String, Value>,
}

impl ElementDefinitionBinding {
    pub fn new(strength: BindingStrength, value_set: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            strength,
            description: None,
            value_set: Some(value_set.into()),
            additional: None,
            extras: HashMap::new(),
        }
    }
}

impl Validate for ElementDefinitionBinding {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.uri("valueSet", self.value_set.as_deref());
        ctx.each("additional", &self.additional);
        ctx.unknown_elements(&self.extras);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBindingAdditional {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// maximum | minimum | required | extensible | candidate | current | preferred | ui | starter | component
    pub purpose: String,

    /// The value set for the additional binding
    pub value_set: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    /// Concise documentation - for summary tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_doco: Option<String>,

    /// Qualifies the usage - jurisdiction, gender, workflow status etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<UsageContext>>,

    /// Whether binding can applies to all repeats, or just one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any: Option<bool>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for ElementDefinitionBindingAdditional {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("purpose", &self.purpose);
        ctx.code("purpose", Some(self.purpose.as_str()));
        ctx.required_str("valueSet", &self.value_set);
        ctx.uri("valueSet", Some(self.value_set.as_str()));
        ctx.each("usage", &self.usage);
        ctx.unknown_elements(&self.additional);
    }
}

/// Mapping to another standard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Reference to mapping declaration
    pub identity: String,

    /// Computable language of mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Details of the mapping
    pub map: String,

    /// Comments about the mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for ElementDefinitionMapping {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("identity", &self.identity);
        ctx.id("identity", Some(self.identity.as_str()));
        ctx.code("language", self.language.as_deref());
        ctx.required_str("map", &self.map);
        ctx.unknown_elements(&self.additional);
    }
}

/// Slicing information for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionSlicing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Element values that are used to distinguish slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<ElementDefinitionDiscriminator>>,

    /// Text description of how slicing works (or not)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// If elements must be in same order as slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,

    /// closed | open | openAtEnd
    pub rules: SlicingRules,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ElementDefinitionSlicing {
    pub fn new(rules: SlicingRules) -> Self {
        Self {
            id: None,
            extension: None,
            discriminator: None,
            description: None,
            ordered: None,
            rules,
            additional: HashMap::new(),
        }
    }
}

impl Validate for ElementDefinitionSlicing {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.each("discriminator", &self.discriminator);

        let has_discriminator = self.discriminator.as_ref().is_some_and(|d| !d.is_empty());
        ctx.invariant(
            "eld-1",
            has_discriminator || self.description.is_some(),
            "If there are no discriminators, there must be a definition",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Discriminator for slicing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionDiscriminator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// value | exists | type | profile | position
    #[serde(rename = "type")]
    pub discriminator_type: DiscriminatorType,

    /// Path to element value
    pub path: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for ElementDefinitionDiscriminator {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("path", &self.path);
        ctx.unknown_elements(&self.additional);
    }
}

/// Keys of `map` that spell `prefix` followed by a type name, sorted
fn choice_keys<'a>(map: &'a HashMap<String, Value>, prefix: &str) -> Vec<&'a str> {
    let mut keys: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|key| is_choice_key(key, prefix))
        .collect();
    keys.sort_unstable();
    keys
}

fn find_choice<'a>(map: &'a HashMap<String, Value>, prefix: &str) -> Option<(&'a str, &'a Value)> {
    let key = choice_keys(map, prefix).into_iter().next()?;
    map.get_key_value(key).map(|(k, v)| (k.as_str(), v))
}

impl ElementDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Get the key for this element (path:sliceName for slices, just path otherwise)
    pub fn key(&self) -> String {
        if let Some(ref slice_name) = self.slice_name {
            format!("{}:{}", self.path, slice_name)
        } else {
            self.path.clone()
        }
    }

    pub fn is_slice(&self) -> bool {
        self.slice_name.is_some()
    }

    /// Get the parent path (everything before the last '.')
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rfind('.').map(|pos| &self.path[..pos])
    }

    /// Check if this element is a descendant of the given path
    pub fn is_descendant_of(&self, parent_path: &str) -> bool {
        self.path.starts_with(parent_path)
            && self.path.len() > parent_path.len()
            && self.path.as_bytes().get(parent_path.len()) == Some(&b'.')
    }

    /// Check if this is a choice type element (ends with [x])
    pub fn is_choice_type(&self) -> bool {
        self.path.ends_with("[x]")
    }

    pub fn type_codes(&self) -> Vec<&str> {
        self.types
            .iter()
            .flatten()
            .map(|t| t.code.as_str())
            .collect()
    }

    /// min > 0
    pub fn is_required(&self) -> bool {
        self.min.unwrap_or(0) > 0
    }

    /// Check if element is array/list (max = "*" or max > 1)
    pub fn is_array(&self) -> bool {
        self.max
            .as_ref()
            .map(|m| m == "*" || m.parse::<u32>().map(|n| n > 1).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Get the cardinality as a string (e.g., "0..1", "1..*")
    pub fn cardinality_string(&self) -> String {
        let min = self.min.unwrap_or(0);
        let max = self.max.as_deref().unwrap_or("*");
        format!("{}..{}", min, max)
    }

    /// Read an open-typed choice element, e.g. `choice_value("fixed")`
    /// returns `("fixedCode", "final")` when `fixedCode` is set
    pub fn choice_value(&self, prefix: &str) -> Option<(&str, &Value)> {
        find_choice(&self.additional, prefix)
    }

    /// Set an open-typed choice element, replacing any other type of the same group
    pub fn set_choice_value(&mut self, prefix: &str, type_name: &str, value: Value) {
        let stale: Vec<String> = choice_keys(&self.additional, prefix)
            .into_iter()
            .map(str::to_string)
            .collect();
        for key in stale {
            self.additional.remove(&key);
        }
        self.additional.insert(format!("{prefix}{type_name}"), value);
    }
}

impl Validate for ElementDefinition {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("path", &self.path);
        ctx.each("code", &self.code);
        ctx.optional("slicing", &self.slicing);
        ctx.optional("base", &self.base);
        ctx.uri("contentReference", self.content_reference.as_deref());
        ctx.each("type", &self.types);
        ctx.each("example", &self.example);
        ctx.each("constraint", &self.constraint);
        ctx.optional("binding", &self.binding);
        ctx.each("mapping", &self.mapping);
        ctx.uris("valueAlternatives", &self.value_alternatives);

        for prefix in OPEN_CHOICE_PREFIXES {
            let keys = choice_keys(&self.additional, prefix);
            if keys.len() > 1 {
                let variants: Vec<(&str, bool)> = keys.iter().map(|key| (*key, true)).collect();
                ctx.choice(&format!("{prefix}[x]"), &variants);
            }
        }

        if let Some(max) = self.max.as_deref() {
            if max != "*" && max.parse::<u32>().is_err() {
                ctx.error_at(
                    "max",
                    IssueType::Value,
                    format!("'{max}' is not a valid maximum cardinality"),
                );
            }
        }

        let ordered = match (self.min, self.max.as_deref().and_then(|m| m.parse::<u32>().ok())) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        ctx.invariant("eld-2", ordered, "Min <= Max");

        let has_types = self.types.as_ref().is_some_and(|t| !t.is_empty());
        ctx.invariant(
            "eld-5",
            self.content_reference.is_none() || !has_types,
            "if the element definition has a contentReference, it cannot have type",
        );

        let has_fixed = self.choice_value("fixed").is_some();
        let has_pattern = self.choice_value("pattern").is_some();
        ctx.invariant(
            "eld-6",
            !has_fixed || self.types.as_ref().map_or(0, Vec::len) <= 1,
            "Fixed value may only be specified if there is one type",
        );
        ctx.invariant(
            "eld-8",
            !(has_fixed && has_pattern),
            "Pattern and fixed are mutually exclusive",
        );

        let mut unknown = self.additional.clone();
        unknown.retain(|key, _| {
            !OPEN_CHOICE_PREFIXES
                .iter()
                .any(|prefix| is_choice_key(key, prefix))
        });
        ctx.unknown_elements(&unknown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;
    use serde_json::json;

    #[test]
    fn test_element_key() {
        let elem = ElementDefinition {
            slice_name: Some("official".to_string()),
            ..ElementDefinition::new("Patient.name")
        };

        assert_eq!(elem.key(), "Patient.name:official");
        assert!(elem.is_slice());
        assert_eq!(elem.parent_path(), Some("Patient"));
    }

    #[test]
    fn test_is_choice_type() {
        let mut elem = ElementDefinition::new("Observation.value[x]");
        assert!(elem.is_choice_type());

        elem.path = "Observation.value".to_string();
        assert!(!elem.is_choice_type());
        assert!(elem.is_descendant_of("Observation"));
        assert!(!elem.is_descendant_of("Obs"));
    }

    #[test]
    fn test_cardinality_string() {
        let elem = ElementDefinition {
            min: Some(1),
            max: Some("*".to_string()),
            ..ElementDefinition::new("Patient.name")
        };

        assert_eq!(elem.cardinality_string(), "1..*");
        assert!(elem.is_required());
        assert!(elem.is_array());
    }

    #[test]
    fn test_open_choice_round_trip() {
        let json = json!({
            "id": "Observation.status",
            "path": "Observation.status",
            "min": 1,
            "max": "1",
            "type": [{ "code": "code" }],
            "fixedCode": "final"
        });
        let elem: ElementDefinition = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(elem.choice_value("fixed"), Some(("fixedCode", &json!("final"))));
        assert_eq!(elem.choice_value("pattern"), None);
        assert_eq!(elem.type_codes(), vec!["code"]);
        assert_eq!(serde_json::to_value(&elem).unwrap(), json);
        assert!(Validator::default()
            .validate_element("ElementDefinition", &elem)
            .issues
            .is_empty());
    }

    #[test]
    fn test_set_choice_value_replaces_group() {
        let mut elem = ElementDefinition::new("Observation.value[x]");
        elem.set_choice_value("pattern", "String", json!("a"));
        elem.set_choice_value("pattern", "Code", json!("b"));
        assert_eq!(elem.choice_value("pattern"), Some(("patternCode", &json!("b"))));
        assert_eq!(elem.additional.len(), 1);
    }

    #[test]
    fn test_two_fixed_types_rejected() {
        let mut elem = ElementDefinition::new("Observation.status");
        elem.additional.insert("fixedCode".to_string(), json!("final"));
        elem.additional.insert("fixedString".to_string(), json!("final"));

        let outcome = Validator::default().validate_element("ElementDefinition", &elem);
        assert!(outcome
            .issues_at("ElementDefinition.fixed[x]")
            .any(|issue| issue.is_error()));
    }

    #[test]
    fn test_min_above_max() {
        let elem = ElementDefinition {
            min: Some(2),
            max: Some("1".to_string()),
            ..ElementDefinition::new("Patient.name")
        };
        let outcome = Validator::default().validate_element("ElementDefinition", &elem);
        assert!(outcome.issues[0].diagnostics.contains("eld-2"));

        let bad_max = ElementDefinition {
            max: Some("many".to_string()),
            ..ElementDefinition::new("Patient.name")
        };
        let outcome = Validator::default().validate_element("ElementDefinition", &bad_max);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("ElementDefinition.max"));
    }

    #[test]
    fn test_example_needs_exactly_one_value() {
        let example: ElementDefinitionExample = serde_json::from_value(json!({
            "label": "General",
            "valueString": "x"
        }))
        .unwrap();
        assert_eq!(example.value(), Some(("valueString", &json!("x"))));

        let elem = ElementDefinition {
            example: Some(vec![ElementDefinitionExample {
                label: "Empty".to_string(),
                ..Default::default()
            }]),
            ..ElementDefinition::new("Patient.name")
        };
        let outcome = Validator::default().validate_element("ElementDefinition", &elem);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("ElementDefinition.example[0].value[x]")
        );
    }

    #[test]
    fn test_required_parts() {
        let result: Result<ElementDefinitionConstraint, _> = serde_json::from_value(json!({
            "key": "obs-6",
            "human": "dataAbsentReason SHALL only be present if value[x] is not present"
        }));
        assert!(result.unwrap_err().to_string().contains("severity"));

        let constraint =
            ElementDefinitionConstraint::new("bad key!", ConstraintSeverity::Error, "");
        let outcome = Validator::default().validate_element("Constraint", &constraint);
        assert!(outcome.issues_at("Constraint.key").next().is_some());
        assert!(outcome.issues_at("Constraint.human").next().is_some());
    }
}
