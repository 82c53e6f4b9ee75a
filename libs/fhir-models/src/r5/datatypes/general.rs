//! General purpose data types: codes, identifiers, references, quantities
//! and the small structures built from them

use super::Extension;
use crate::r5::codes::{IdentifierUse, QuantityComparator};
use crate::validation::{Validate, ValidationContext};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A reference to a code defined by a terminology system
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Identity of the terminology system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Version of the system - if relevant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Symbol in syntax defined by the system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Representation defined by the system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// If this coding was chosen directly by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_selected: Option<bool>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// True when both system and code match
    pub fn matches(&self, system: &str, code: &str) -> bool {
        self.system.as_deref() == Some(system) && self.code.as_deref() == Some(code)
    }
}

impl Validate for Coding {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.uri("system", self.system.as_deref());
        ctx.code("code", self.code.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

/// Concept - reference to a terminology or just text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Code defined by a terminology system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding: Option<Vec<Coding>>,

    /// Plain text representation of the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: Some(vec![coding]),
            ..Default::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// True if any coding matches the system and code
    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.coding
            .iter()
            .flatten()
            .any(|coding| coding.matches(system, code))
    }
}

impl Validate for CodeableConcept {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.each("coding", &self.coding);
        ctx.unknown_elements(&self.additional);
    }
}

/// Reference to a resource or a concept
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeableReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for CodeableReference {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("concept", &self.concept);
        ctx.optional("reference", &self.reference);
        ctx.unknown_elements(&self.additional);
    }
}

/// An identifier intended for computation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// usual | official | temp | secondary | old
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<IdentifierUse>,

    /// Description of identifier
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    /// The namespace for the identifier value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The value that is unique
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Time period when id is/was valid for use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Organization that issued id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Identifier {
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

impl Validate for Identifier {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("type", &self.type_);
        ctx.uri("system", self.system.as_deref());
        ctx.optional("period", &self.period);
        ctx.optional("assigner", &self.assigner);
        ctx.unknown_elements(&self.additional);
    }
}

/// A reference from one resource to another
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Literal reference, relative, internal or absolute URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Type the reference refers to (e.g. "Patient")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Logical reference, when literal reference is not known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Box<Identifier>>,

    /// Text alternative for the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// `Patient/123` -> `Some(("Patient", "123"))`
    pub fn type_and_id(&self) -> Option<(&str, &str)> {
        let reference = self.reference.as_deref()?;
        let mut parts = reference.rsplit('/');
        let id = parts.next()?;
        let resource_type = parts.next()?;
        if resource_type.is_empty() || id.is_empty() {
            return None;
        }
        Some((resource_type, id))
    }

    /// `#id` references point at a contained resource
    pub fn is_contained(&self) -> bool {
        self.reference
            .as_deref()
            .is_some_and(|reference| reference.starts_with('#'))
    }
}

impl Validate for Reference {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.uri("type", self.type_.as_deref());
        ctx.optional("identifier", &self.identifier);
        ctx.unknown_elements(&self.additional);
    }
}

/// Time range defined by start and end date/time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Starting time with inclusive boundary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// End time with inclusive boundary, if not ongoing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Period {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            ..Default::default()
        }
    }
}

impl Validate for Period {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.date_time("start", self.start.as_deref());
        ctx.date_time("end", self.end.as_deref());

        let ordered = match (&self.start, &self.end) {
            (Some(start), Some(end)) => period_ordered(start, end),
            _ => true,
        };
        ctx.invariant(
            "per-1",
            ordered,
            "If present, start SHALL have a lower or equal value than end",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// `start <= end` for two `dateTime` values.
///
/// Values with a time part are compared as instants, so differing offsets
/// are honoured. Date-only values compare on their shared precision, so
/// `2024` is not after `2024-03-01`.
fn period_ordered(start: &str, end: &str) -> bool {
    if start.contains('T') || end.contains('T') {
        return match (
            DateTime::parse_from_rfc3339(start),
            DateTime::parse_from_rfc3339(end),
        ) {
            (Ok(start), Ok(end)) => start <= end,
            // Mixed precision or a malformed value: the format check reports the latter
            _ => true,
        };
    }

    let shared = start.len().min(end.len());
    start.as_bytes()[..shared] <= end.as_bytes()[..shared]
}

/// A measured or measurable amount
///
/// `SimpleQuantity`, `Age`, `Duration`, `Distance`, `Count` and
/// `MoneyQuantity` are profiles of this type and share its representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Numerical value (with implicit precision)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// < | <= | >= | > | ad - how to understand the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<QuantityComparator>,

    /// Unit representation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// System that defines coded unit form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Coded form of the unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

pub type SimpleQuantity = Quantity;
pub type Age = Quantity;
pub type Duration = Quantity;
pub type Distance = Quantity;
pub type Count = Quantity;
pub type MoneyQuantity = Quantity;

/// UCUM code system URI
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            unit: Some(unit.into()),
            ..Default::default()
        }
    }

    /// Quantity with a UCUM coded unit
    pub fn ucum(value: f64, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            value: Some(value),
            unit: Some(code.clone()),
            system: Some(UCUM_SYSTEM.to_string()),
            code: Some(code),
            ..Default::default()
        }
    }
}

impl Validate for Quantity {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.uri("system", self.system.as_deref());
        ctx.code("code", self.code.as_deref());
        ctx.invariant(
            "qty-3",
            self.code.is_none() || self.system.is_some(),
            "If a code for the unit is present, the system SHALL also be present",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// An amount of economic utility in some recognized currency
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// ISO 4217 Currency Code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Money {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.code("currency", self.currency.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

/// Set of values bounded by low and high
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Low limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<SimpleQuantity>,

    /// High limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<SimpleQuantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Range {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("low", &self.low);
        ctx.optional("high", &self.high);

        let low = self.low.as_ref().and_then(|q| q.value);
        let high = self.high.as_ref().and_then(|q| q.value);
        let ordered = match (low, high) {
            (Some(low), Some(high)) => low <= high,
            _ => true,
        };
        ctx.invariant(
            "rng-2",
            ordered,
            "If present, low SHALL have a lower value than high",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// A ratio of two Quantity values - a numerator and a denominator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ratio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerator: Option<Quantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<SimpleQuantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Ratio {
    pub fn new(numerator: Quantity, denominator: Quantity) -> Self {
        Self {
            numerator: Some(numerator),
            denominator: Some(denominator),
            ..Default::default()
        }
    }
}

impl Validate for Ratio {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("numerator", &self.numerator);
        ctx.optional("denominator", &self.denominator);

        let has_extension = self.extension.as_ref().is_some_and(|e| !e.is_empty());
        let holds = match (&self.numerator, &self.denominator) {
            (Some(_), Some(_)) => true,
            (None, None) => has_extension,
            _ => false,
        };
        ctx.invariant(
            "rat-1",
            holds,
            "Numerator and denominator SHALL both be present, or both are absent",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Range of ratio values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatioRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_numerator: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_numerator: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<SimpleQuantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for RatioRange {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("lowNumerator", &self.low_numerator);
        ctx.optional("highNumerator", &self.high_numerator);
        ctx.optional("denominator", &self.denominator);
        ctx.unknown_elements(&self.additional);
    }
}

/// A series of measurements taken by a device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampledData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Zero value and units
    pub origin: SimpleQuantity,

    /// Number of intervalUnits between samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,

    /// The measurement unit of the interval between samples
    pub interval_unit: String,

    /// Multiply data by this before adding to origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,

    /// Number of sample points at each time point
    pub dimensions: u32,

    /// Defines the codes used in the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_map: Option<String>,

    /// Offsets, typically in time, at which data values were taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offsets: Option<String>,

    /// Decimal values with spaces, or "E" | "U" | "L", or another code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl SampledData {
    pub fn new(origin: SimpleQuantity, interval_unit: impl Into<String>, dimensions: u32) -> Self {
        Self {
            id: None,
            extension: None,
            origin,
            interval: None,
            interval_unit: interval_unit.into(),
            factor: None,
            lower_limit: None,
            upper_limit: None,
            dimensions,
            code_map: None,
            offsets: None,
            data: None,
            additional: HashMap::new(),
        }
    }
}

impl Validate for SampledData {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.field("origin", &self.origin);
        ctx.required_str("intervalUnit", &self.interval_unit);
        ctx.code("intervalUnit", Some(self.interval_unit.as_str()));
        ctx.positive_int("dimensions", Some(self.dimensions));
        ctx.uri("codeMap", self.code_map.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

/// Content in a format defined elsewhere
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Mime type of the content, with charset etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Human language of the content (BCP-47)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Data inline, base64ed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Uri where the data can be found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Number of bytes of content (integer64, a JSON string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Hash of the data (sha-1, base64ed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Date attachment was first created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,

    /// Length in seconds (audio / video)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Attachment {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.code("contentType", self.content_type.as_deref());
        ctx.code("language", self.language.as_deref());
        ctx.uri("url", self.url.as_deref());
        ctx.date_time("creation", self.creation.as_deref());
        ctx.positive_int("height", self.height);
        ctx.positive_int("width", self.width);
        ctx.positive_int("frames", self.frames);
        ctx.positive_int("pages", self.pages);
        ctx.invariant(
            "att-1",
            self.data.is_none() || self.content_type.is_some(),
            "If the Attachment has data, it SHALL have a contentType",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Text node with attribution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_string: Option<String>,

    /// When the annotation was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// The annotation - text content (as markdown)
    pub text: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Annotation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl Validate for Annotation {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.choice(
            "author[x]",
            &[
                ("authorReference", self.author_reference.is_some()),
                ("authorString", self.author_string.is_some()),
            ],
        );
        ctx.optional("authorReference", &self.author_reference);
        ctx.date_time("time", self.time.as_deref());
        ctx.required_str("text", &self.text);
        ctx.unknown_elements(&self.additional);
    }
}

/// A signature along with supporting context
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Indication of the reason the entity signed the object(s)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<Coding>>,

    /// When the signature was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    /// Who signed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub who: Option<Reference>,

    /// The party represented
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<Reference>,

    /// The technical format of the signed resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_format: Option<String>,

    /// The technical format of the signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig_format: Option<String>,

    /// The actual signature content (XML DigSig, JWS, picture, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Signature {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.each("type", &self.type_);
        ctx.instant("when", self.when.as_deref());
        ctx.optional("who", &self.who);
        ctx.optional("onBehalfOf", &self.on_behalf_of);
        ctx.code("targetFormat", self.target_format.as_deref());
        ctx.code("sigFormat", self.sig_format.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::validation::Validator;
    use serde_json::json;

    #[test]
    fn test_coding_round_trip_omits_empty_fields() {
        let coding = Coding::new("http://loinc.org", "29463-7").with_display("Body weight");
        let json = serde_json::to_value(&coding).unwrap();
        assert_eq!(
            json,
            json!({
                "system": "http://loinc.org",
                "code": "29463-7",
                "display": "Body weight"
            })
        );
        assert!(CodeableConcept::from_coding(coding).has_coding("http://loinc.org", "29463-7"));
    }

    #[test]
    fn test_identifier_use_keyword_field() {
        let identifier: Identifier = serde_json::from_value(json!({
            "use": "official",
            "system": "urn:oid:1.2.36.146.595.217.0.1",
            "value": "12345"
        }))
        .unwrap();
        assert_eq!(identifier.use_, Some(IdentifierUse::Official));
        assert_eq!(serde_json::to_value(&identifier).unwrap()["use"], "official");
    }

    #[test]
    fn test_reference_type_and_id() {
        assert_eq!(
            Reference::new("Patient/123").type_and_id(),
            Some(("Patient", "123"))
        );
        assert_eq!(
            Reference::new("http://example.org/fhir/Patient/123").type_and_id(),
            Some(("Patient", "123"))
        );
        assert_eq!(Reference::new("#p1").type_and_id(), None);
        assert!(Reference::new("#p1").is_contained());
    }

    #[test]
    fn test_period_order_invariant() {
        let validator = Validator::default();

        let ok = Period::new(Some("2024-01-01"), Some("2024-02-01"));
        assert!(validator.validate_element("Period", &ok).valid);

        let backwards = Period::new(Some("2024-03-01"), Some("2024-02-01"));
        let outcome = validator.validate_element("Period", &backwards);
        assert!(!outcome.valid);
        assert_eq!(outcome.issues[0].code, IssueType::Invariant);
        assert!(outcome.issues[0].diagnostics.contains("per-1"));

        // coarser dates compare on the precision both share
        let month = Period::new(Some("2024-02"), Some("2024-02-15"));
        assert!(validator.validate_element("Period", &month).valid);
        let after = Period::new(Some("2024-03"), Some("2024-02-01"));
        assert!(!validator.validate_element("Period", &after).valid);
    }

    #[test]
    fn test_period_order_uses_instants_across_offsets() {
        let validator = Validator::default();

        // 05:00Z starts before 09:00Z
        let shifted = Period::new(
            Some("2024-01-01T10:00:00+05:00"),
            Some("2024-01-01T09:00:00+00:00"),
        );
        assert!(validator.validate_element("Period", &shifted).valid);

        // 12:00Z ends before 13:00Z
        let reversed = Period::new(
            Some("2024-01-01T13:00:00Z"),
            Some("2024-01-01T14:00:00+02:00"),
        );
        let outcome = validator.validate_element("Period", &reversed);
        assert!(outcome.issues[0].diagnostics.contains("per-1"));

        let mixed = Period::new(Some("2024-01-01T10:00:00Z"), Some("2024-01-01"));
        assert!(validator.validate_element("Period", &mixed).valid);
    }

    #[test]
    fn test_quantity_code_requires_system() {
        let validator = Validator::default();
        assert!(validator
            .validate_element("Quantity", &Quantity::ucum(72.5, "kg"))
            .valid);

        let quantity = Quantity {
            value: Some(1.0),
            code: Some("mg".to_string()),
            ..Default::default()
        };
        let outcome = validator.validate_element("Quantity", &quantity);
        assert!(outcome.issues[0].diagnostics.contains("qty-3"));
    }

    #[test]
    fn test_quantity_comparator_symbol() {
        let quantity: Quantity =
            serde_json::from_value(json!({ "value": 5, "comparator": "<" })).unwrap();
        assert_eq!(quantity.comparator, Some(QuantityComparator::LessThan));
        assert_eq!(quantity.value, Some(5.0));
    }

    #[test]
    fn test_ratio_requires_both_parts() {
        let validator = Validator::default();
        let full = Ratio::new(Quantity::new(1.0, "mg"), Quantity::new(1.0, "mL"));
        assert!(validator.validate_element("Ratio", &full).valid);

        let half = Ratio {
            numerator: Some(Quantity::new(1.0, "mg")),
            ..Default::default()
        };
        let outcome = validator.validate_element("Ratio", &half);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].diagnostics.contains("rat-1"));
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Ratio"));

        // an empty ratio must at least carry an extension
        assert!(!validator.validate_element("Ratio", &Ratio::default()).valid);
    }

    #[test]
    fn test_range_low_above_high() {
        let range = Range {
            low: Some(Quantity::new(10.0, "mmol/L")),
            high: Some(Quantity::new(5.0, "mmol/L")),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("Range", &range);
        assert!(outcome.issues[0].diagnostics.contains("rng-2"));
    }

    #[test]
    fn test_annotation_requires_text_and_single_author() {
        let annotation = Annotation {
            author_string: Some("Dr. Who".to_string()),
            author_reference: Some(Reference::new("Practitioner/1")),
            text: " ".to_string(),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("Annotation", &annotation);
        assert_eq!(outcome.error_count(), 2);
        assert!(outcome.issues_at("Annotation.author[x]").next().is_some());
        assert!(outcome.issues_at("Annotation.text").next().is_some());
    }

    #[test]
    fn test_sampled_data_requires_origin() {
        let missing: Result<SampledData, _> =
            serde_json::from_value(json!({ "intervalUnit": "ms", "dimensions": 1 }));
        assert!(missing.unwrap_err().to_string().contains("origin"));

        let data = SampledData::new(Quantity::new(0.0, "mV"), "ms", 0);
        let outcome = Validator::default().validate_element("SampledData", &data);
        assert!(outcome.issues_at("SampledData.dimensions").next().is_some());
    }

    #[test]
    fn test_attachment_data_requires_content_type() {
        let attachment = Attachment {
            data: Some("aGVsbG8=".to_string()),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("Attachment", &attachment);
        assert!(outcome.issues[0].diagnostics.contains("att-1"));
    }
}
