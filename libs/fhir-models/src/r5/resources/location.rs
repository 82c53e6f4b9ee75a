//! FHIR Location resource

use super::Resource;
use crate::r5::codes::{LocationMode, LocationStatus};
use crate::r5::datatypes::{
    Address, Availability, CodeableConcept, Coding, ExtendedContactDetail, Extension, Identifier,
    Meta, Narrative, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Details and position information for a place where services are provided
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Resource type - always "Location"
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
    pub status: Option<LocationStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_status: Option<Coding>,

    /// Name of the location as used by humans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this is a specific instance or a class of locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<LocationMode>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ExtendedContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Physical form of the location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<LocationPosition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_of_operation: Option<Vec<Availability>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Vec<Reference>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Location".to_string()
}

/// The absolute geographic location (WGS84 datum)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub longitude: f64,

    pub latitude: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Location {
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
            status: None,
            operational_status: None,
            name: None,
            alias: None,
            description: None,
            mode: None,
            type_: None,
            contact: None,
            address: None,
            form: None,
            position: None,
            managing_organization: None,
            part_of: None,
            characteristic: None,
            hours_of_operation: None,
            endpoint: None,
            additional: HashMap::new(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationPosition {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            longitude,
            latitude,
            altitude: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Location);

impl Validate for Location {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Location");
        ctx.each("identifier", &self.identifier);
        ctx.optional("operationalStatus", &self.operational_status);
        ctx.each("type", &self.type_);
        ctx.each("contact", &self.contact);
        ctx.optional("address", &self.address);
        ctx.optional("form", &self.form);
        ctx.optional("position", &self.position);
        ctx.optional("managingOrganization", &self.managing_organization);
        ctx.optional("partOf", &self.part_of);
        ctx.each("characteristic", &self.characteristic);
        ctx.each("hoursOfOperation", &self.hours_of_operation);
        ctx.each("endpoint", &self.endpoint);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for LocationPosition {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::LocationStatus;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_location_position() {
        let location = Location::from_value(json!({
            "resourceType": "Location",
            "status": "active",
            "name": "South Wing, second floor",
            "position": {"longitude": -83.6945691, "latitude": 42.25475478, "altitude": 0}
        }))
        .unwrap();

        assert_eq!(location.status, Some(LocationStatus::Active));
        let position = location.position.as_ref().unwrap();
        assert!((position.latitude - 42.25475478).abs() < f64::EPSILON);
        assert!(location.validate().valid);
    }

    #[test]
    fn test_position_requires_coordinates() {
        let result = Location::from_value(json!({
            "resourceType": "Location",
            "position": {"longitude": 10.0}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_constructed_position_serializes() {
        let mut location = Location::new();
        location.position = Some(LocationPosition::new(4.895, 52.370));
        let value = location.to_value().unwrap();
        assert_eq!(value["position"]["longitude"], 4.895);
        assert!(value["position"].get("altitude").is_none());
    }
}
