//! Names, addresses and contact points

use super::{Extension, Period};
use crate::r5::codes::{AddressType, AddressUse, ContactPointSystem, ContactPointUse, NameUse};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Name of a human or other living entity - parts and usage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// usual | official | temp | nickname | anonymous | old | maiden
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<NameUse>,

    /// Text representation of the full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Family name (often called 'Surname')
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Given names (not always 'first'). Includes middle names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<Vec<String>>,

    /// Time period when name was/is in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl HumanName {
    pub fn new(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: Some(family.into()),
            given: Some(vec![given.into()]),
            ..Default::default()
        }
    }

    /// `text` when present, otherwise given names followed by the family name
    pub fn display(&self) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }
        self.given
            .iter()
            .flatten()
            .chain(self.family.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Validate for HumanName {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("period", &self.period);
        ctx.unknown_elements(&self.additional);
    }
}

/// An address expressed using postal conventions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// home | work | temp | old | billing - purpose of this address
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<AddressUse>,

    /// postal | physical | both
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<AddressType>,

    /// Text representation of the address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Street name, number, direction & P.O. Box etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// District name (aka county)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    /// Sub-unit of country (abbreviations ok)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// Country (e.g. may be ISO 3166 2 or 3 letter code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Address {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("period", &self.period);
        ctx.unknown_elements(&self.additional);
    }
}

/// Details of a technology mediated contact point (phone, fax, email, etc.)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// phone | fax | email | pager | url | sms | other
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<ContactPointSystem>,

    /// The actual contact point details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// home | work | temp | old | mobile - purpose of this contact point
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<ContactPointUse>,

    /// Specify preferred order of use (1 = highest)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ContactPoint {
    pub fn new(system: ContactPointSystem, value: impl Into<String>) -> Self {
        Self {
            system: Some(system),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

impl Validate for ContactPoint {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.positive_int("rank", self.rank);
        ctx.optional("period", &self.period);
        ctx.invariant(
            "cpt-2",
            self.value.is_none() || self.system.is_some(),
            "A system is required if a value is provided",
        );
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;
    use serde_json::json;

    #[test]
    fn test_human_name_display() {
        let name = HumanName {
            given: Some(vec!["Peter".to_string(), "James".to_string()]),
            family: Some("Chalmers".to_string()),
            ..Default::default()
        };
        assert_eq!(name.display(), "Peter James Chalmers");

        let named = HumanName {
            text: Some("Jim".to_string()),
            ..name
        };
        assert_eq!(named.display(), "Jim");
    }

    #[test]
    fn test_address_keyword_fields() {
        let address: Address = serde_json::from_value(json!({
            "use": "home",
            "type": "both",
            "line": ["534 Erewhon St"],
            "postalCode": "3999"
        }))
        .unwrap();
        assert_eq!(address.use_, Some(AddressUse::Home));
        assert_eq!(address.type_, Some(AddressType::Both));
        assert_eq!(address.postal_code.as_deref(), Some("3999"));
    }

    #[test]
    fn test_contact_point_value_requires_system() {
        let validator = Validator::default();
        let phone = ContactPoint::new(ContactPointSystem::Phone, "(03) 5555 6473");
        assert!(validator.validate_element("ContactPoint", &phone).valid);

        let bare = ContactPoint {
            value: Some("(03) 5555 6473".to_string()),
            ..Default::default()
        };
        let outcome = validator.validate_element("ContactPoint", &bare);
        assert!(outcome.issues[0].diagnostics.contains("cpt-2"));
    }
}
