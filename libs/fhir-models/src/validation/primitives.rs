//! Lexical checks for string-shaped FHIR primitives
//!
//! Patterns follow the regular expressions published with the R5 primitive
//! type definitions.

use regex::Regex;
use std::sync::OnceLock;

/// String-shaped FHIR primitive with a lexical form worth checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Id,
    Code,
    Uri,
    Date,
    DateTime,
    Instant,
    Time,
    Oid,
    Uuid,
}

impl Primitive {
    /// FHIR type name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::Uri => "uri",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Instant => "instant",
            Self::Time => "time",
            Self::Oid => "oid",
            Self::Uuid => "uuid",
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.regex().is_match(value)
    }

    fn regex(&self) -> &'static Regex {
        static ID: OnceLock<Regex> = OnceLock::new();
        static CODE: OnceLock<Regex> = OnceLock::new();
        static URI: OnceLock<Regex> = OnceLock::new();
        static DATE: OnceLock<Regex> = OnceLock::new();
        static DATE_TIME: OnceLock<Regex> = OnceLock::new();
        static INSTANT: OnceLock<Regex> = OnceLock::new();
        static TIME: OnceLock<Regex> = OnceLock::new();
        static OID: OnceLock<Regex> = OnceLock::new();
        static UUID: OnceLock<Regex> = OnceLock::new();

        let (cell, pattern) = match self {
            Self::Id => (&ID, r"^[A-Za-z0-9\-\.]{1,64}$"),
            Self::Code => (&CODE, r"^[^\s]+( [^\s]+)*$"),
            Self::Uri => (&URI, r"^\S*$"),
            Self::Date => (
                &DATE,
                r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1]))?)?$",
            ),
            Self::DateTime => (
                &DATE_TIME,
                r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1])(T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?)?)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00)?)?)?$",
            ),
            Self::Instant => (
                &INSTANT,
                r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)-(0[1-9]|1[0-2])-(0[1-9]|[1-2][0-9]|3[0-1])T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))$",
            ),
            Self::Time => (
                &TIME,
                r"^([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?$",
            ),
            Self::Oid => (&OID, r"^urn:oid:[0-2](\.(0|[1-9][0-9]*))+$"),
            Self::Uuid => (
                &UUID,
                r"^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
            ),
        };

        cell.get_or_init(|| Regex::new(pattern).expect("primitive regex must compile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id() {
        assert!(Primitive::Id.is_valid("example-1.a"));
        assert!(!Primitive::Id.is_valid("has space"));
        assert!(!Primitive::Id.is_valid(""));
        assert!(!Primitive::Id.is_valid(&"a".repeat(65)));
    }

    #[test]
    fn test_code() {
        assert!(Primitive::Code.is_valid("final"));
        assert!(Primitive::Code.is_valid("two words"));
        assert!(!Primitive::Code.is_valid(" leading"));
        assert!(!Primitive::Code.is_valid("double  space"));
    }

    #[test]
    fn test_date_and_date_time() {
        assert!(Primitive::Date.is_valid("2024"));
        assert!(Primitive::Date.is_valid("2024-02"));
        assert!(Primitive::Date.is_valid("2024-02-29"));
        assert!(!Primitive::Date.is_valid("2024-13-01"));
        assert!(!Primitive::Date.is_valid("24-01-01"));

        assert!(Primitive::DateTime.is_valid("2024-02-29"));
        assert!(Primitive::DateTime.is_valid("2024-02-29T10:15:00Z"));
        assert!(Primitive::DateTime.is_valid("2024-02-29T10:15:00.123+01:00"));
        assert!(!Primitive::DateTime.is_valid("2024-02-29 10:15"));
    }

    #[test]
    fn test_instant_requires_full_precision() {
        assert!(Primitive::Instant.is_valid("2015-02-07T13:28:17.239+02:00"));
        assert!(!Primitive::Instant.is_valid("2015-02-07"));
        assert!(!Primitive::Instant.is_valid("2015-02-07T13:28:17"));
    }

    #[test]
    fn test_time_oid_uuid_uri() {
        assert!(Primitive::Time.is_valid("23:59:60"));
        assert!(!Primitive::Time.is_valid("24:00:00"));
        assert!(Primitive::Oid.is_valid("urn:oid:2.16.840.1.113883"));
        assert!(!Primitive::Oid.is_valid("2.16.840"));
        assert!(Primitive::Uuid.is_valid("urn:uuid:c757873d-ec9a-4326-a141-556f43239520"));
        assert!(!Primitive::Uuid.is_valid("urn:uuid:C757873D"));
        assert!(Primitive::Uri.is_valid("http://hl7.org/fhir"));
        assert!(!Primitive::Uri.is_valid("http://hl7.org/ fhir"));
    }
}
