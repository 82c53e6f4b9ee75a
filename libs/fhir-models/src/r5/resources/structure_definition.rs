//! FHIR StructureDefinition resource

use super::Resource;
use crate::r5::codes::{
    ExtensionContextType, PublicationStatus, StructureDefinitionKind, TypeDerivationRule,
};
use crate::r5::datatypes::{
    CodeableConcept, Coding, ContactDetail, ElementDefinition, Extension, Identifier, Meta,
    Narrative, UsageContext,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A definition of a FHIR structure. This resource is used to describe the underlying resources,
/// data types defined in FHIR, and also for describing extensions and constraints on resources
/// and data types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Resource type - always "StructureDefinition"
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
    pub url: String,

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
    pub name: String,

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

    /// Assist with indexing and finding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Vec<Coding>>,

    /// FHIR Version this StructureDefinition targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,

    /// External specification that the content is mapped to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<StructureDefinitionMapping>>,

    /// primitive-type | complex-type | resource | logical
    pub kind: StructureDefinitionKind,

    /// Whether the structure is abstract
    #[serde(rename = "abstract")]
    pub is_abstract: bool,

    /// If an extension, where it can be used in instances
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<StructureDefinitionContext>>,

    /// FHIRPath invariants - when the extension can be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_invariant: Option<Vec<String>>,

    /// Type defined or constrained by this structure
    #[serde(rename = "type")]
    pub type_: String,

    /// Definition that this type is constrained/specialized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    /// specialization | constraint - How relates to base definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    /// Snapshot view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<StructureDefinitionSnapshot>,

    /// Differential view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<StructureDefinitionDifferential>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinitionMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Internal id when this mapping is used
    pub identity: String,

    /// Identifies what this mapping refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Names what this mapping refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Versions, Issues, Scope limitations etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinitionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// fhirpath | element | extension
    #[serde(rename = "type")]
    pub type_: ExtensionContextType,

    /// Where the extension can be used in instances
    pub expression: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// A snapshot view is expressed in a standalone form that can be used and interpreted without
/// considering the base StructureDefinition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinitionSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Definition of elements in the resource (if no StructureDefinition)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub element: Vec<ElementDefinition>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// A differential view is expressed relative to the base StructureDefinition - a statement of
/// differences that it applies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinitionDifferential {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Definition of elements in the resource (if no StructureDefinition)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub element: Vec<ElementDefinition>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl StructureDefinition {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        status: PublicationStatus,
        kind: StructureDefinitionKind,
        is_abstract: bool,
        type_: impl Into<String>,
    ) -> Self {
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
            url: url.into(),
            identifier: None,
            version: None,
            version_algorithm_string: None,
            version_algorithm_coding: None,
            name: name.into(),
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
            keyword: None,
            fhir_version: None,
            mapping: None,
            kind,
            is_abstract,
            context: None,
            context_invariant: None,
            type_: type_.into(),
            base_definition: None,
            derivation: None,
            snapshot: None,
            differential: None,
            additional: HashMap::new(),
        }
    }

    /// A constraint on another structure, as opposed to a new type
    pub fn is_profile(&self) -> bool {
        self.derivation == Some(TypeDerivationRule::Constraint)
    }

    pub fn is_extension(&self) -> bool {
        self.type_ == "Extension"
    }

    /// Look an element up in the snapshot, falling back to the differential
    pub fn element(&self, path: &str) -> Option<&ElementDefinition> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.get_element(path))
            .or_else(|| {
                self.differential
                    .as_ref()
                    .and_then(|differential| differential.get_element(path))
            })
    }
}

impl StructureDefinitionMapping {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            identity: identity.into(),
            uri: None,
            name: None,
            comment: None,
            additional: HashMap::new(),
        }
    }
}

impl StructureDefinitionContext {
    pub fn new(type_: ExtensionContextType, expression: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            type_,
            expression: expression.into(),
            additional: HashMap::new(),
        }
    }
}

impl StructureDefinitionSnapshot {
    pub fn new(element: Vec<ElementDefinition>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            element,
            additional: HashMap::new(),
        }
    }

    pub fn get_element(&self, path: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|element| element.path == path)
    }

    pub fn get_element_mut(&mut self, path: &str) -> Option<&mut ElementDefinition> {
        self.element.iter_mut().find(|element| element.path == path)
    }

    /// Direct children of `parent_path`, slices included
    pub fn get_children(&self, parent_path: &str) -> Vec<&ElementDefinition> {
        let depth = path_depth(parent_path) + 1;
        self.element
            .iter()
            .filter(|element| {
                element.is_descendant_of(parent_path) && path_depth(&element.path) == depth
            })
            .collect()
    }

    /// Order by depth, then path. A base element sorts before its slices.
    pub fn sort_elements(&mut self) {
        self.element.sort_by(|a, b| {
            path_depth(&a.path)
                .cmp(&path_depth(&b.path))
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.slice_name.cmp(&b.slice_name))
        });
    }
}

impl StructureDefinitionDifferential {
    pub fn new(element: Vec<ElementDefinition>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            element,
            additional: HashMap::new(),
        }
    }

    pub fn get_element(&self, path: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|element| element.path == path)
    }

    pub fn get_element_mut(&mut self, path: &str) -> Option<&mut ElementDefinition> {
        self.element.iter_mut().find(|element| element.path == path)
    }

    /// Direct children of `parent_path`, slices included
    pub fn get_children(&self, parent_path: &str) -> Vec<&ElementDefinition> {
        let depth = path_depth(parent_path) + 1;
        self.element
            .iter()
            .filter(|element| {
                element.is_descendant_of(parent_path) && path_depth(&element.path) == depth
            })
            .collect()
    }
}

impl_fhir_resource!(StructureDefinition);

impl Validate for StructureDefinition {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "StructureDefinition");
        ctx.required_str("url", &self.url);
        ctx.uri("url", Some(self.url.as_str()));
        ctx.each("identifier", &self.identifier);
        ctx.choice(
            "versionAlgorithm[x]",
            &[
                ("versionAlgorithmString", self.version_algorithm_string.is_some()),
                ("versionAlgorithmCoding", self.version_algorithm_coding.is_some()),
            ],
        );
        ctx.optional("versionAlgorithmCoding", &self.version_algorithm_coding);
        ctx.required_str("name", &self.name);
        ctx.date_time("date", self.date.as_deref());
        ctx.each("contact", &self.contact);
        ctx.each("useContext", &self.use_context);
        ctx.each("jurisdiction", &self.jurisdiction);
        ctx.each("keyword", &self.keyword);
        ctx.code("fhirVersion", self.fhir_version.as_deref());
        ctx.each("mapping", &self.mapping);
        ctx.each("context", &self.context);
        ctx.required_str("type", &self.type_);
        ctx.uri("type", Some(self.type_.as_str()));
        ctx.uri("baseDefinition", self.base_definition.as_deref());
        ctx.optional("snapshot", &self.snapshot);
        ctx.optional("differential", &self.differential);

        ctx.invariant(
            "sdf-5",
            !self.is_extension()
                || self.derivation == Some(TypeDerivationRule::Specialization)
                || self.context.is_some(),
            "If the structure defines an extension then the structure must have context information",
        );
        ctx.invariant(
            "sdf-6",
            self.snapshot.is_some() || self.differential.is_some(),
            "A structure must have either a differential, or a snapshot (or both)",
        );

        if let Some(snapshot) = &self.snapshot {
            if self.derivation != Some(TypeDerivationRule::Constraint) {
                let mut seen = HashSet::new();
                let distinct = snapshot
                    .element
                    .iter()
                    .all(|element| seen.insert(element.path.as_str()));
                ctx.invariant(
                    "sdf-1",
                    distinct,
                    "Element paths must be unique unless the structure is a constraint",
                );
            }

            if self.kind != StructureDefinitionKind::Logical {
                let rooted = snapshot.element.iter().all(|element| {
                    element.path == self.type_ || element.is_descendant_of(&self.type_)
                });
                ctx.invariant(
                    "sdf-8",
                    rooted,
                    "All snapshot elements must start with the StructureDefinition's specified type for non-logical models",
                );
            }

            ctx.invariant(
                "sdf-8b",
                snapshot.element.iter().all(|element| element.base.is_some()),
                "All snapshot elements must have a base definition",
            );
        }

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for StructureDefinitionMapping {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("identity", &self.identity);
        ctx.id("identity", Some(self.identity.as_str()));
        ctx.uri("uri", self.uri.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for StructureDefinitionContext {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("expression", &self.expression);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for StructureDefinitionSnapshot {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_each("element", &self.element);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for StructureDefinitionDifferential {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_each("element", &self.element);
        ctx.unknown_elements(&self.additional);
    }
}

fn path_depth(path: &str) -> usize {
    path.matches('.').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use crate::validation::ValidationOutcome;
    use serde_json::json;
    use crate::r5::datatypes::ElementDefinitionBase;

    fn has_invariant(outcome: &ValidationOutcome, key: &str) -> bool {
        outcome
            .issues
            .iter()
            .any(|issue| issue.code == IssueType::Invariant && issue.diagnostics.contains(key))
    }

    fn element(path: &str, min: u32, max: &str) -> ElementDefinition {
        let mut element = ElementDefinition::new(path);
        element.min = Some(min);
        element.max = Some(max.to_string());
        element.base = Some(ElementDefinitionBase {
            path: path.to_string(),
            min,
            max: max.to_string(),
            ..Default::default()
        });
        element
    }

    fn profile() -> StructureDefinition {
        StructureDefinition::from_value(json!({
            "resourceType": "StructureDefinition",
            "id": "vitalsigns",
            "url": "http://hl7.org/fhir/StructureDefinition/vitalsigns",
            "name": "observation-vitalsigns",
            "status": "draft",
            "fhirVersion": "5.0.0",
            "kind": "resource",
            "abstract": false,
            "type": "Observation",
            "baseDefinition": "http://hl7.org/fhir/StructureDefinition/Observation",
            "derivation": "constraint",
            "differential": {
                "element": [
                    {"id": "Observation", "path": "Observation"},
                    {"id": "Observation.status", "path": "Observation.status", "fixedCode": "final"},
                    {"id": "Observation.category", "path": "Observation.category", "min": 1},
                    {"id": "Observation.category:VSCat", "path": "Observation.category", "sliceName": "VSCat", "min": 1, "max": "1"},
                    {"id": "Observation.code.coding", "path": "Observation.code.coding"}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_profile() {
        let profile = profile();
        assert!(profile.is_profile());
        assert!(!profile.is_abstract);
        assert_eq!(profile.kind, StructureDefinitionKind::Resource);

        let status = profile.element("Observation.status").unwrap();
        assert_eq!(status.choice_value("fixed").map(|(key, _)| key), Some("fixedCode"));

        let differential = profile.differential.as_ref().unwrap();
        let children = differential.get_children("Observation");
        assert_eq!(children.len(), 3);
        assert_eq!(differential.get_children("Observation.code").len(), 1);

        let outcome = profile.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_abstract_round_trips() {
        let value = profile().to_value().unwrap();
        assert_eq!(value["abstract"], false);
        assert_eq!(value["type"], "Observation");
        assert!(value.get("isAbstract").is_none());
    }

    #[test]
    fn test_required_header_elements() {
        let result = StructureDefinition::from_value(json!({
            "resourceType": "StructureDefinition",
            "url": "http://example.org/fhir/StructureDefinition/x",
            "name": "X",
            "status": "draft",
            "kind": "resource",
            "type": "Patient"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_needs_snapshot_or_differential() {
        let definition = StructureDefinition::new(
            "http://example.org/fhir/StructureDefinition/empty",
            "Empty",
            PublicationStatus::Draft,
            StructureDefinitionKind::ComplexType,
            false,
            "Empty",
        );
        assert!(has_invariant(&definition.validate(), "sdf-6"));
    }

    #[test]
    fn test_extension_needs_context() {
        let mut extension = StructureDefinition::new(
            "http://example.org/fhir/StructureDefinition/birth-place",
            "BirthPlace",
            PublicationStatus::Active,
            StructureDefinitionKind::ComplexType,
            false,
            "Extension",
        );
        extension.derivation = Some(TypeDerivationRule::Constraint);
        extension.differential = Some(StructureDefinitionDifferential::new(vec![
            ElementDefinition::new("Extension"),
            ElementDefinition::new("Extension.value[x]"),
        ]));
        assert!(extension.is_extension());
        assert!(has_invariant(&extension.validate(), "sdf-5"));

        extension.context = Some(vec![StructureDefinitionContext::new(
            ExtensionContextType::Element,
            "Patient",
        )]);
        assert!(extension.validate().valid);
    }

    #[test]
    fn test_snapshot_rules() {
        let mut definition = StructureDefinition::new(
            "http://example.org/fhir/StructureDefinition/Widget",
            "Widget",
            PublicationStatus::Draft,
            StructureDefinitionKind::Resource,
            false,
            "Widget",
        );
        definition.derivation = Some(TypeDerivationRule::Specialization);
        definition.snapshot = Some(StructureDefinitionSnapshot::new(vec![
            element("Widget", 0, "*"),
            element("Widget.part", 0, "1"),
            element("Widget.part", 0, "1"),
            element("Gadget.part", 0, "1"),
            ElementDefinition::new("Widget.size"),
        ]));

        let outcome = definition.validate();
        assert!(has_invariant(&outcome, "sdf-1"));
        assert!(has_invariant(&outcome, "sdf-8:"));
        assert!(has_invariant(&outcome, "sdf-8b"));
    }

    #[test]
    fn test_sort_elements() {
        let mut snapshot = StructureDefinitionSnapshot::new(vec![
            element("Patient.name.family", 0, "1"),
            element("Patient.name", 0, "*"),
            element("Patient", 0, "*"),
            element("Patient.identifier", 0, "*"),
        ]);
        let mut slice = element("Patient.identifier", 0, "1");
        slice.slice_name = Some("mrn".to_string());
        snapshot.element.insert(0, slice);

        snapshot.sort_elements();
        let keys: Vec<String> = snapshot.element.iter().map(ElementDefinition::key).collect();
        assert_eq!(
            keys,
            vec![
                "Patient",
                "Patient.identifier",
                "Patient.identifier:mrn",
                "Patient.name",
                "Patient.name.family",
            ]
        );

        snapshot.get_element_mut("Patient.name").unwrap().min = Some(1);
        assert!(snapshot.get_element("Patient.name").unwrap().is_required());
    }
}
