//! Structural validation of FHIR models
//!
//! Every model type implements [`Validate`]: it checks its own required
//! elements, choice groups and primitive formats, then recurses into its
//! children through the [`ValidationContext`]. A [`Validator`] runs the walk
//! under a compiled [`ValidationPlan`] and packages the result as a
//! [`ValidationOutcome`].

mod config;
mod context;
mod outcome;
pub mod primitives;

pub use config::{
    ExecConfig, InvariantsConfig, InvariantsPlan, Preset, SchemaConfig, SchemaPlan,
    ValidationPlan, ValidatorConfig, ValidatorConfigBuilder,
};
pub use context::ValidationContext;
pub use outcome::{ValidationIssue, ValidationOutcome};

use crate::error::{ConfigError, Error};
use crate::r5::codes::IssueType;
use crate::r5::resources::{FhirResource, Resource};
use serde_json::Value;

/// Structural validation walk for a model type
pub trait Validate {
    /// Record issues for `self` (and its children) against `ctx`.
    ///
    /// The context path already points at `self` when this is called.
    fn validate_into(&self, ctx: &mut ValidationContext<'_>);
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        (**self).validate_into(ctx);
    }
}

/// Reusable validator - owns the compiled plan
#[derive(Debug, Clone, Default)]
pub struct Validator {
    plan: ValidationPlan,
}

impl Validator {
    pub fn new(plan: ValidationPlan) -> Self {
        Self { plan }
    }

    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        let plan = config.compile()?;
        Ok(Self::new(plan))
    }

    pub fn plan(&self) -> &ValidationPlan {
        &self.plan
    }

    /// Validate a typed resource
    pub fn validate<R: FhirResource>(&self, resource: &R) -> ValidationOutcome {
        self.run(R::RESOURCE_TYPE, Some(R::RESOURCE_TYPE.to_string()), resource)
    }

    /// Validate any supported resource
    pub fn validate_resource(&self, resource: &Resource) -> ValidationOutcome {
        let resource_type = resource.resource_type();
        self.run(resource_type, Some(resource_type.to_string()), resource)
    }

    /// Validate a data type or backbone element on its own, rooted at `root`
    pub fn validate_element<T: Validate + ?Sized>(&self, root: &str, value: &T) -> ValidationOutcome {
        self.run(root, None, value)
    }

    /// Parse a JSON resource and validate it. Documents that do not parse
    /// produce a single `structure` error at the element that failed.
    pub fn validate_value(&self, value: &Value) -> ValidationOutcome {
        let declared = value
            .get("resourceType")
            .and_then(Value::as_str)
            .map(str::to_string);

        match Resource::from_value(value.clone()) {
            Ok(resource) => self.validate_resource(&resource),
            Err(err) => {
                tracing::debug!(error = %err, "resource failed to parse");
                let (location, diagnostics) = match err {
                    Error::InvalidContent { location, message } => (location, message),
                    other => (
                        declared.clone().unwrap_or_else(|| "Resource".to_string()),
                        other.to_string(),
                    ),
                };
                ValidationOutcome::from_issues(
                    declared,
                    vec![ValidationIssue::error(IssueType::Structure, diagnostics)
                        .with_location(location)],
                )
            }
        }
    }

    pub fn validate_batch(&self, resources: &[Value]) -> Vec<ValidationOutcome> {
        resources.iter().map(|r| self.validate_value(r)).collect()
    }

    fn run<T: Validate + ?Sized>(
        &self,
        root: &str,
        resource_type: Option<String>,
        value: &T,
    ) -> ValidationOutcome {
        let mut ctx = ValidationContext::new(&self.plan, root);
        value.validate_into(&mut ctx);
        let outcome = ValidationOutcome::from_issues(resource_type, ctx.into_issues());

        tracing::debug!(
            root,
            valid = outcome.valid,
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            "validation finished"
        );

        outcome
    }
}
