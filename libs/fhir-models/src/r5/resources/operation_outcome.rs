//! FHIR OperationOutcome resource

use super::Resource;
use crate::r5::codes::{IssueSeverity, IssueType};
use crate::r5::datatypes::{CodeableConcept, Extension, Meta, Narrative};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A collection of error, warning, or information messages that result from a system action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    /// Resource type - always "OperationOutcome"
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

    /// A single issue associated with the action
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue: Vec<OperationOutcomeIssue>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "OperationOutcome".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcomeIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// fatal | error | warning | information | success
    pub severity: IssueSeverity,

    /// Error or warning code
    pub code: IssueType,

    /// Additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CodeableConcept>,

    /// Additional diagnostic information about the issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<String>>,

    /// FHIRPath of element(s) related to issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<Vec<String>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl OperationOutcome {
    pub fn new(issue: Vec<OperationOutcomeIssue>) -> Self {
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
            issue,
            additional: HashMap::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.issue.iter().any(OperationOutcomeIssue::is_error)
    }

    /// Issues with `error` or `fatal` severity
    pub fn errors(&self) -> impl Iterator<Item = &OperationOutcomeIssue> {
        self.issue.iter().filter(|issue| issue.is_error())
    }
}

impl OperationOutcomeIssue {
    pub fn new(severity: IssueSeverity, code: IssueType) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            severity,
            code,
            details: None,
            diagnostics: None,
            location: None,
            expression: None,
            additional: HashMap::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> Self {
        self.diagnostics = Some(diagnostics.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression.get_or_insert_with(Vec::new).push(expression.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, IssueSeverity::Error | IssueSeverity::Fatal)
    }
}

impl_fhir_resource!(OperationOutcome);

impl Validate for OperationOutcome {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "OperationOutcome");
        ctx.required_each("issue", &self.issue);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for OperationOutcomeIssue {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("details", &self.details);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_serialize_outcome() {
        let outcome = OperationOutcome::new(vec![OperationOutcomeIssue::new(
            IssueSeverity::Error,
            IssueType::Required,
        )
        .with_diagnostics("Missing required element 'status'")
        .with_expression("Observation.status")]);

        let value = outcome.to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "resourceType": "OperationOutcome",
                "issue": [{
                    "severity": "error",
                    "code": "required",
                    "diagnostics": "Missing required element 'status'",
                    "expression": ["Observation.status"]
                }]
            })
        );
    }

    #[test]
    fn test_errors_filter() {
        let outcome = OperationOutcome::from_value(json!({
            "resourceType": "OperationOutcome",
            "issue": [
                {"severity": "warning", "code": "structure"},
                {"severity": "fatal", "code": "exception", "details": {"text": "boom"}}
            ]
        }))
        .unwrap();

        assert!(outcome.has_errors());
        let errors: Vec<_> = outcome.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, IssueType::Exception);
        assert!(outcome.validate().valid);
    }

    #[test]
    fn test_issue_required() {
        let outcome =
            OperationOutcome::from_value(json!({"resourceType": "OperationOutcome"})).unwrap();
        assert!(!outcome.has_errors());

        let validation = outcome.validate();
        assert!(!validation.valid);
        assert_eq!(
            validation.issues[0].location.as_deref(),
            Some("OperationOutcome.issue")
        );
    }

    #[test]
    fn test_unknown_severity_rejected() {
        let result = OperationOutcome::from_value(json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "panic", "code": "exception"}]
        }));
        assert!(result.is_err());
    }
}
