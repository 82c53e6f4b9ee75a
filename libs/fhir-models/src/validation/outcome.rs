use crate::error::{Error, Result};
use crate::r5::codes::{IssueSeverity, IssueType};
use crate::r5::resources::{OperationOutcome, OperationOutcomeIssue};

/// Validation result for a single resource or element
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub resource_type: Option<String>,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn success(resource_type: Option<String>) -> Self {
        Self {
            resource_type,
            valid: true,
            issues: Vec::new(),
        }
    }

    pub(crate) fn from_issues(resource_type: Option<String>, issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues.iter().any(ValidationIssue::is_error);
        Self {
            resource_type,
            valid,
            issues,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Issues reported at exactly this location
    pub fn issues_at<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues
            .iter()
            .filter(move |i| i.location.as_deref() == Some(location))
    }

    pub fn to_operation_outcome(&self) -> OperationOutcome {
        let issue = if self.issues.is_empty() {
            vec![OperationOutcomeIssue::new(
                IssueSeverity::Information,
                IssueType::Informational,
            )
            .with_diagnostics("All OK")]
        } else {
            self.issues.iter().map(ValidationIssue::to_outcome_issue).collect()
        };

        OperationOutcome::new(issue)
    }

    /// Turn an outcome with errors into [`Error::Validation`]
    pub fn into_result(self) -> Result<()> {
        let error_count = self.error_count();
        if error_count == 0 {
            return Ok(());
        }

        let first = self
            .issues
            .iter()
            .find(|i| i.is_error())
            .map(ToString::to_string)
            .unwrap_or_default();

        Err(Error::Validation { error_count, first })
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,
    pub diagnostics: String,
    pub location: Option<String>,
    pub expression: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn error(code: IssueType, diagnostics: String) -> Self {
        Self::new(IssueSeverity::Error, code, diagnostics)
    }

    pub fn warning(code: IssueType, diagnostics: String) -> Self {
        Self::new(IssueSeverity::Warning, code, diagnostics)
    }

    pub fn information(code: IssueType, diagnostics: String) -> Self {
        Self::new(IssueSeverity::Information, code, diagnostics)
    }

    fn new(severity: IssueSeverity, code: IssueType, diagnostics: String) -> Self {
        Self {
            severity,
            code,
            diagnostics,
            location: None,
            expression: None,
        }
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_expression(mut self, expression: Vec<String>) -> Self {
        self.expression = Some(expression);
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, IssueSeverity::Error | IssueSeverity::Fatal)
    }

    fn to_outcome_issue(&self) -> OperationOutcomeIssue {
        let mut issue =
            OperationOutcomeIssue::new(self.severity, self.code).with_diagnostics(&self.diagnostics);
        issue.location = self.location.clone().map(|loc| vec![loc]);
        issue.expression = self.expression.clone();
        issue
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "{} [{}] {}: {}",
                self.severity, self.code, location, self.diagnostics
            ),
            None => write!(f, "{} [{}] {}", self.severity, self.code, self.diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_outcome_operations() {
        let outcome = ValidationOutcome::from_issues(
            Some("Patient".to_string()),
            vec![
                ValidationIssue::error(IssueType::Required, "Missing required field".to_string()),
                ValidationIssue::warning(IssueType::Value, "Deprecated code".to_string()),
            ],
        );

        assert!(!outcome.valid);
        assert!(outcome.has_errors());
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn test_warnings_alone_are_valid() {
        let outcome = ValidationOutcome::from_issues(
            None,
            vec![ValidationIssue::warning(
                IssueType::Structure,
                "Unrecognized element".to_string(),
            )],
        );
        assert!(outcome.valid);
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn test_operation_outcome_conversion() {
        let outcome = ValidationOutcome::from_issues(
            Some("Patient".to_string()),
            vec![ValidationIssue::error(
                IssueType::Required,
                "name is required".to_string(),
            )
            .with_location("Patient.name".to_string())
            .with_expression(vec!["Patient.name".to_string()])],
        );

        let op_outcome = outcome.to_operation_outcome();
        let json = serde_json::to_value(&op_outcome).unwrap();
        assert_eq!(json["resourceType"], "OperationOutcome");
        assert_eq!(json["issue"][0]["severity"], "error");
        assert_eq!(json["issue"][0]["code"], "required");
        assert_eq!(json["issue"][0]["location"][0], "Patient.name");
    }

    #[test]
    fn test_empty_outcome_reports_all_ok() {
        let op_outcome = ValidationOutcome::success(None).to_operation_outcome();
        assert_eq!(op_outcome.issue.len(), 1);
        assert_eq!(op_outcome.issue[0].severity, IssueSeverity::Information);
        assert_eq!(op_outcome.issue[0].diagnostics.as_deref(), Some("All OK"));
    }

    #[test]
    fn test_into_result_carries_first_error() {
        let outcome = ValidationOutcome::from_issues(
            None,
            vec![ValidationIssue::error(IssueType::Required, "status missing".to_string())
                .with_location("Observation.status".to_string())],
        );

        match outcome.into_result() {
            Err(Error::Validation { error_count, first }) => {
                assert_eq!(error_count, 1);
                assert!(first.contains("Observation.status"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
