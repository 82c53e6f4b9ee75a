//! FHIR Device resource

use super::Resource;
use crate::r5::codes::{DeviceNameType, DeviceStatus, UdiEntryType};
use crate::r5::datatypes::{
    Annotation, Attachment, CodeableConcept, CodeableReference, ContactPoint, Count, Duration,
    Extension, Identifier, Meta, Narrative, Quantity, Range, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A type of manufactured item that is used in the provision of healthcare without being
/// substantially changed through that activity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Resource type - always "Device"
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

    /// Instance identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// The name used to display by default when the device is referenced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<CodeableReference>,

    /// Unique Device Identifier (UDI) Barcode string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udi_carrier: Option<Vec<DeviceUdiCarrier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub biological_source_event: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacture_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<DeviceName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Vec<DeviceVersion>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conforms_to: Option<Vec<DeviceConformsTo>>,

    /// Inherent, essentially fixed, characteristics of the device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<DeviceProperty>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Count>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ContactPoint>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Reference>,

    /// Network address to contact device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Vec<CodeableReference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<Annotation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Reference>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Device".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUdiCarrier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Mandatory fixed portion of UDI
    pub device_identifier: String,

    /// UDI Issuing Organization
    pub issuer: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,

    #[serde(rename = "carrierAIDC", skip_serializing_if = "Option::is_none")]
    pub carrier_aidc: Option<String>,

    #[serde(rename = "carrierHRF", skip_serializing_if = "Option::is_none")]
    pub carrier_hrf: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<UdiEntryType>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub value: String,

    #[serde(rename = "type")]
    pub type_: DeviceNameType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_date: Option<String>,

    pub value: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConformsTo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CodeableConcept>,

    pub specification: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(rename = "type")]
    pub type_: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_attachment: Option<Attachment>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Device {
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
            display_name: None,
            definition: None,
            udi_carrier: None,
            status: None,
            availability_status: None,
            biological_source_event: None,
            manufacturer: None,
            manufacture_date: None,
            expiration_date: None,
            lot_number: None,
            serial_number: None,
            name: None,
            model_number: None,
            part_number: None,
            category: None,
            type_: None,
            version: None,
            conforms_to: None,
            property: None,
            mode: None,
            cycle: None,
            duration: None,
            owner: None,
            contact: None,
            location: None,
            url: None,
            endpoint: None,
            gateway: None,
            note: None,
            safety: None,
            parent: None,
            additional: HashMap::new(),
        }
    }

    /// The name flagged for display, else the first registered name
    pub fn preferred_name(&self) -> Option<&str> {
        if let Some(name) = self.display_name.as_deref() {
            return Some(name);
        }
        let names = self.name.as_deref()?;
        names
            .iter()
            .find(|name| name.display == Some(true))
            .or_else(|| {
                names
                    .iter()
                    .find(|name| name.type_ == DeviceNameType::RegisteredName)
            })
            .map(|name| name.value.as_str())
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceUdiCarrier {
    pub fn new(device_identifier: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            device_identifier: device_identifier.into(),
            issuer: issuer.into(),
            jurisdiction: None,
            carrier_aidc: None,
            carrier_hrf: None,
            entry_type: None,
            additional: HashMap::new(),
        }
    }
}

impl DeviceName {
    pub fn new(value: impl Into<String>, type_: DeviceNameType) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            value: value.into(),
            type_,
            display: None,
            additional: HashMap::new(),
        }
    }
}

impl DeviceVersion {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            type_: None,
            component: None,
            install_date: None,
            value: value.into(),
            additional: HashMap::new(),
        }
    }
}

impl DeviceConformsTo {
    pub fn new(specification: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            category: None,
            specification,
            version: None,
            additional: HashMap::new(),
        }
    }
}

impl DeviceProperty {
    pub fn new(type_: CodeableConcept) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            type_,
            value_quantity: None,
            value_codeable_concept: None,
            value_string: None,
            value_boolean: None,
            value_integer: None,
            value_range: None,
            value_attachment: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Device);

impl Validate for Device {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Device");
        ctx.each("identifier", &self.identifier);
        ctx.optional("definition", &self.definition);
        ctx.each("udiCarrier", &self.udi_carrier);
        ctx.optional("availabilityStatus", &self.availability_status);
        ctx.optional("biologicalSourceEvent", &self.biological_source_event);
        ctx.date_time("manufactureDate", self.manufacture_date.as_deref());
        ctx.date_time("expirationDate", self.expiration_date.as_deref());
        ctx.each("name", &self.name);
        ctx.each("category", &self.category);
        ctx.each("type", &self.type_);
        ctx.each("version", &self.version);
        ctx.each("conformsTo", &self.conforms_to);
        ctx.each("property", &self.property);
        ctx.optional("mode", &self.mode);
        ctx.optional("cycle", &self.cycle);
        ctx.optional("duration", &self.duration);
        ctx.optional("owner", &self.owner);
        ctx.each("contact", &self.contact);
        ctx.optional("location", &self.location);
        ctx.uri("url", self.url.as_deref());
        ctx.each("endpoint", &self.endpoint);
        ctx.each("gateway", &self.gateway);
        ctx.each("note", &self.note);
        ctx.each("safety", &self.safety);
        ctx.optional("parent", &self.parent);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DeviceUdiCarrier {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("deviceIdentifier", &self.device_identifier);
        ctx.required_str("issuer", &self.issuer);
        ctx.uri("issuer", Some(self.issuer.as_str()));
        ctx.uri("jurisdiction", self.jurisdiction.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DeviceName {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DeviceVersion {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("type", &self.type_);
        ctx.optional("component", &self.component);
        ctx.date_time("installDate", self.install_date.as_deref());
        ctx.required_str("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DeviceConformsTo {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("category", &self.category);
        ctx.field("specification", &self.specification);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for DeviceProperty {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("type", &self.type_);
        ctx.required_choice(
            "value[x]",
            &[
                ("valueQuantity", self.value_quantity.is_some()),
                ("valueCodeableConcept", self.value_codeable_concept.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueInteger", self.value_integer.is_some()),
                ("valueRange", self.value_range.is_some()),
                ("valueAttachment", self.value_attachment.is_some()),
            ],
        );
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueCodeableConcept", &self.value_codeable_concept);
        ctx.optional("valueRange", &self.value_range);
        ctx.optional("valueAttachment", &self.value_attachment);
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
    fn test_device_names() {
        let device = Device::from_value(json!({
            "resourceType": "Device",
            "status": "active",
            "name": [
                {"value": "Acme Infusion Pump", "type": "user-friendly-name"},
                {"value": "AIP-2000", "type": "registered-name"}
            ],
            "udiCarrier": [{"deviceIdentifier": "09504000059118", "issuer": "http://hl7.org/fhir/NamingSystem/gs1-di"}]
        }))
        .unwrap();

        assert_eq!(device.preferred_name(), Some("AIP-2000"));
        assert!(device.validate().valid);
    }

    #[test]
    fn test_property_value_is_required() {
        let device = Device::from_value(json!({
            "resourceType": "Device",
            "property": [{"type": {"text": "battery"}}]
        }))
        .unwrap();

        let outcome = device.validate();
        assert!(!outcome.valid);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Device.property[0].value[x]"));
    }

    #[test]
    fn test_property_with_two_values() {
        let mut property = DeviceProperty::new(CodeableConcept::from_text("battery"));
        property.value_boolean = Some(true);
        property.value_integer = Some(3);

        let mut device = Device::new();
        device.property = Some(vec![property]);
        let outcome = device.validate();
        assert_eq!(outcome.issues[0].code, IssueType::Structure);
    }

    #[test]
    fn test_udi_issuer_must_not_be_blank() {
        let mut device = Device::new();
        device.udi_carrier = Some(vec![DeviceUdiCarrier::new("09504000059118", " ")]);
        let outcome = device.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Device.udiCarrier[0].issuer")
        );
    }
}
