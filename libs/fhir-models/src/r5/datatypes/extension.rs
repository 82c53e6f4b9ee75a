//! FHIR Extension

use super::{
    is_choice_key, Address, Age, Annotation, Attachment, Availability, CodeableConcept,
    CodeableReference, Coding, ContactDetail, ContactPoint, Count, Distance, Dosage, Duration,
    Expression, ExtendedContactDetail, HumanName, Identifier, Meta, Money, Period, Quantity, Range,
    Ratio, RatioRange, Reference, RelatedArtifact, SampledData, Signature, Timing, UsageContext,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Optional extension element
///
/// Carries either a `value[x]` or nested extensions. Value types this model
/// does not declare (e.g. `valueInteger64`) are kept in `additional`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Identifies the meaning of the extension
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_base64_binary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_decimal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_instant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_oid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_positive_int: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_unsigned_int: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uuid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_age: Option<Age>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_annotation: Option<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_reference: Option<CodeableReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_contact_point: Option<ContactPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_count: Option<Count>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_distance: Option<Distance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_duration: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_human_name: Option<HumanName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_money: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ratio: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ratio_range: Option<RatioRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_sampled_data: Option<SampledData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_signature: Option<Signature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_timing: Option<Timing>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_contact_detail: Option<ContactDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_expression: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_related_artifact: Option<RelatedArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_usage_context: Option<UsageContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_availability: Option<Availability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_extended_contact_detail: Option<ExtendedContactDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_dosage: Option<Dosage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_meta: Option<Meta>,

    /// Elements not declared above
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Extension {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_value_string(url: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value_string: Some(value.into()),
            ..Self::new(url)
        }
    }

    pub fn with_value_code(url: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            value_code: Some(code.into()),
            ..Self::new(url)
        }
    }

    /// JSON name of the populated `value[x]` element, e.g. `valueQuantity`
    pub fn value_type(&self) -> Option<&str> {
        self.value_variants()
            .into_iter()
            .find(|(_, present)| *present)
            .map(|(name, _)| name)
    }

    /// Nested extensions with the given url
    pub fn extensions_by_url<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Extension> {
        self.extension.iter().flatten().filter(move |e| e.url == url)
    }

    fn value_variants(&self) -> Vec<(&str, bool)> {
        let mut variants = vec![
            ("valueBase64Binary", self.value_base64_binary.is_some()),
            ("valueBoolean", self.value_boolean.is_some()),
            ("valueCanonical", self.value_canonical.is_some()),
            ("valueCode", self.value_code.is_some()),
            ("valueDate", self.value_date.is_some()),
            ("valueDateTime", self.value_date_time.is_some()),
            ("valueDecimal", self.value_decimal.is_some()),
            ("valueId", self.value_id.is_some()),
            ("valueInstant", self.value_instant.is_some()),
            ("valueInteger", self.value_integer.is_some()),
            ("valueMarkdown", self.value_markdown.is_some()),
            ("valueOid", self.value_oid.is_some()),
            ("valuePositiveInt", self.value_positive_int.is_some()),
            ("valueString", self.value_string.is_some()),
            ("valueTime", self.value_time.is_some()),
            ("valueUnsignedInt", self.value_unsigned_int.is_some()),
            ("valueUri", self.value_uri.is_some()),
            ("valueUrl", self.value_url.is_some()),
            ("valueUuid", self.value_uuid.is_some()),
            ("valueAddress", self.value_address.is_some()),
            ("valueAge", self.value_age.is_some()),
            ("valueAnnotation", self.value_annotation.is_some()),
            ("valueAttachment", self.value_attachment.is_some()),
            ("valueCodeableConcept", self.value_codeable_concept.is_some()),
            ("valueCodeableReference", self.value_codeable_reference.is_some()),
            ("valueCoding", self.value_coding.is_some()),
            ("valueContactPoint", self.value_contact_point.is_some()),
            ("valueCount", self.value_count.is_some()),
            ("valueDistance", self.value_distance.is_some()),
            ("valueDuration", self.value_duration.is_some()),
            ("valueHumanName", self.value_human_name.is_some()),
            ("valueIdentifier", self.value_identifier.is_some()),
            ("valueMoney", self.value_money.is_some()),
            ("valuePeriod", self.value_period.is_some()),
            ("valueQuantity", self.value_quantity.is_some()),
            ("valueRange", self.value_range.is_some()),
            ("valueRatio", self.value_ratio.is_some()),
            ("valueRatioRange", self.value_ratio_range.is_some()),
            ("valueReference", self.value_reference.is_some()),
            ("valueSampledData", self.value_sampled_data.is_some()),
            ("valueSignature", self.value_signature.is_some()),
            ("valueTiming", self.value_timing.is_some()),
            ("valueContactDetail", self.value_contact_detail.is_some()),
            ("valueExpression", self.value_expression.is_some()),
            ("valueRelatedArtifact", self.value_related_artifact.is_some()),
            ("valueUsageContext", self.value_usage_context.is_some()),
            ("valueAvailability", self.value_availability.is_some()),
            (
                "valueExtendedContactDetail",
                self.value_extended_contact_detail.is_some(),
            ),
            ("valueDosage", self.value_dosage.is_some()),
            ("valueMeta", self.value_meta.is_some()),
        ];

        let mut undeclared: Vec<&str> = self
            .additional
            .keys()
            .map(String::as_str)
            .filter(|key| is_choice_key(key, "value"))
            .collect();
        undeclared.sort_unstable();
        variants.extend(undeclared.into_iter().map(|key| (key, true)));
        variants
    }
}

impl Validate for Extension {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.required_str("url", &self.url);
        ctx.uri("url", Some(self.url.as_str()));

        let variants = self.value_variants();
        ctx.choice("value[x]", &variants);

        ctx.uri("valueCanonical", self.value_canonical.as_deref());
        ctx.code("valueCode", self.value_code.as_deref());
        ctx.date("valueDate", self.value_date.as_deref());
        ctx.date_time("valueDateTime", self.value_date_time.as_deref());
        ctx.id("valueId", self.value_id.as_deref());
        ctx.instant("valueInstant", self.value_instant.as_deref());
        ctx.oid("valueOid", self.value_oid.as_deref());
        ctx.positive_int("valuePositiveInt", self.value_positive_int);
        ctx.time("valueTime", self.value_time.as_deref());
        ctx.uri("valueUri", self.value_uri.as_deref());
        ctx.uri("valueUrl", self.value_url.as_deref());
        ctx.uuid("valueUuid", self.value_uuid.as_deref());

        ctx.optional("valueAddress", &self.value_address);
        ctx.optional("valueAge", &self.value_age);
        ctx.optional("valueAnnotation", &self.value_annotation);
        ctx.optional("valueAttachment", &self.value_attachment);
        ctx.optional("valueCodeableConcept", &self.value_codeable_concept);
        ctx.optional("valueCodeableReference", &self.value_codeable_reference);
        ctx.optional("valueCoding", &self.value_coding);
        ctx.optional("valueContactPoint", &self.value_contact_point);
        ctx.optional("valueCount", &self.value_count);
        ctx.optional("valueDistance", &self.value_distance);
        ctx.optional("valueDuration", &self.value_duration);
        ctx.optional("valueHumanName", &self.value_human_name);
        ctx.optional("valueIdentifier", &self.value_identifier);
        ctx.optional("valueMoney", &self.value_money);
        ctx.optional("valuePeriod", &self.value_period);
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueRange", &self.value_range);
        ctx.optional("valueRatio", &self.value_ratio);
        ctx.optional("valueRatioRange", &self.value_ratio_range);
        ctx.optional("valueReference", &self.value_reference);
        ctx.optional("valueSampledData", &self.value_sampled_data);
        ctx.optional("valueSignature", &self.value_signature);
        ctx.optional("valueTiming", &self.value_timing);
        ctx.optional("valueContactDetail", &self.value_contact_detail);
        ctx.optional("valueExpression", &self.value_expression);
        ctx.optional("valueRelatedArtifact", &self.value_related_artifact);
        ctx.optional("valueUsageContext", &self.value_usage_context);
        ctx.optional("valueAvailability", &self.value_availability);
        ctx.optional("valueExtendedContactDetail", &self.value_extended_contact_detail);
        ctx.optional("valueDosage", &self.value_dosage);
        ctx.optional("valueMeta", &self.value_meta);

        let has_value = variants.iter().any(|(_, present)| *present);
        let has_extensions = self.extension.as_ref().is_some_and(|e| !e.is_empty());
        ctx.invariant(
            "ext-1",
            has_value != has_extensions,
            "Must have either extensions or value[x], not both",
        );

        let mut unknown = self.additional.clone();
        unknown.retain(|key, _| !is_choice_key(key, "value"));
        ctx.unknown_elements(&unknown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::validation::Validator;
    use serde_json::json;

    #[test]
    fn test_extension_value_type() {
        let ext: Extension = serde_json::from_value(json!({
            "url": "http://hl7.org/fhir/StructureDefinition/patient-birthTime",
            "valueDateTime": "1974-12-25T14:35:45-05:00"
        }))
        .unwrap();
        assert_eq!(ext.value_type(), Some("valueDateTime"));
        assert!(Validator::default().validate_element("Extension", &ext).valid);
    }

    #[test]
    fn test_undeclared_value_type_is_kept() {
        let json = json!({
            "url": "http://example.org/big",
            "valueInteger64": "9007199254740993"
        });
        let ext: Extension = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(ext.value_type(), Some("valueInteger64"));
        assert_eq!(serde_json::to_value(&ext).unwrap(), json);

        let outcome = Validator::default().validate_element("Extension", &ext);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_extension_with_two_values() {
        let ext = Extension {
            value_boolean: Some(true),
            ..Extension::with_value_string("http://example.org/flag", "yes")
        };
        let outcome = Validator::default().validate_element("Extension", &ext);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Structure);
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Extension.value[x]"));
    }

    #[test]
    fn test_extension_value_or_children() {
        let validator = Validator::default();

        let empty = Extension::new("http://example.org/empty");
        let outcome = validator.validate_element("Extension", &empty);
        assert!(outcome.issues[0].diagnostics.contains("ext-1"));

        let complex = Extension {
            extension: Some(vec![Extension::with_value_code(
                "kind",
                "primary",
            )]),
            ..Extension::new("http://example.org/complex")
        };
        assert!(validator.validate_element("Extension", &complex).valid);
        assert_eq!(complex.extensions_by_url("kind").count(), 1);

        let both = Extension {
            value_string: Some("x".to_string()),
            ..complex
        };
        assert!(!validator.validate_element("Extension", &both).valid);
    }

    #[test]
    fn test_missing_url_fails_to_parse() {
        let result: Result<Extension, _> = serde_json::from_value(json!({ "valueBoolean": true }));
        assert!(result.unwrap_err().to_string().contains("url"));
    }

    #[test]
    fn test_nested_paths() {
        let ext = Extension {
            extension: Some(vec![Extension {
                value_date: Some("01/02/2024".to_string()),
                ..Extension::new("when")
            }]),
            ..Extension::new("http://example.org/complex")
        };
        let outcome = Validator::default().validate_element("Extension", &ext);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Extension.extension[0].valueDate")
        );
    }
}
