//! Validator configuration and the compiled plan it produces
//!
//! Configuration is what users write (YAML or builder); the plan is the
//! checked, ready-to-run form the walk consults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Starting points for a configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Presence and choice checks only
    Structural,
    /// Presence, choice, primitive formats and invariants
    #[default]
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Report unrecognized elements as warnings instead of errors
    pub allow_unknown_elements: bool,
    /// Check the lexical form of id, code, uri, date, dateTime, ... values
    pub check_primitive_formats: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            allow_unknown_elements: true,
            check_primitive_formats: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvariantsConfig {
    pub enabled: bool,
}

impl Default for InvariantsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Stop walking after the first error
    pub fail_fast: bool,
    /// Stop recording once this many issues were collected
    pub max_issues: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_issues: 1000,
        }
    }
}

/// User-facing validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub preset: Preset,
    pub schema: SchemaConfig,
    pub invariants: InvariantsConfig,
    pub exec: ExecConfig,
}

impl ValidatorConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Strict => Self::default(),
            Preset::Structural => Self {
                preset,
                schema: SchemaConfig {
                    allow_unknown_elements: true,
                    check_primitive_formats: false,
                },
                invariants: InvariantsConfig { enabled: false },
                exec: ExecConfig::default(),
            },
        }
    }

    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }

    /// Parse YAML; sections present in the document override the named preset
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let overrides: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let preset = match overrides.get("preset") {
            Some(value) => serde_yaml::from_value(value.clone())?,
            None => Preset::default(),
        };

        let mut merged = serde_yaml::to_value(Self::preset(preset))?;
        merge_yaml(&mut merged, overrides);
        Ok(serde_yaml::from_value(merged)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn compile(&self) -> Result<ValidationPlan, ConfigError> {
        if self.exec.max_issues == 0 {
            return Err(ConfigError::InvalidConfig(
                "exec.max_issues must be greater than zero".to_string(),
            ));
        }

        Ok(ValidationPlan {
            schema: SchemaPlan::from(&self.schema),
            invariants: InvariantsPlan::from(&self.invariants),
            fail_fast: self.exec.fail_fast,
            max_issues: self.exec.max_issues,
        })
    }
}

fn merge_yaml(base: &mut serde_yaml::Value, overrides: serde_yaml::Value) {
    use serde_yaml::Value;

    match (base, overrides) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_yaml(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Fluent builder for [`ValidatorConfig`]
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    /// Reset every setting to the given preset
    pub fn preset(mut self, preset: Preset) -> Self {
        self.config = ValidatorConfig::preset(preset);
        self
    }

    pub fn allow_unknown_elements(mut self, allow: bool) -> Self {
        self.config.schema.allow_unknown_elements = allow;
        self
    }

    pub fn check_primitive_formats(mut self, check: bool) -> Self {
        self.config.schema.check_primitive_formats = check;
        self
    }

    pub fn invariants(mut self, enabled: bool) -> Self {
        self.config.invariants.enabled = enabled;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.exec.fail_fast = fail_fast;
        self
    }

    pub fn max_issues(mut self, max_issues: usize) -> Self {
        self.config.exec.max_issues = max_issues;
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}

/// Compiled validation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPlan {
    pub schema: SchemaPlan,
    pub invariants: InvariantsPlan,
    pub fail_fast: bool,
    pub max_issues: usize,
}

impl Default for ValidationPlan {
    fn default() -> Self {
        Self {
            schema: SchemaPlan::from(&SchemaConfig::default()),
            invariants: InvariantsPlan::from(&InvariantsConfig::default()),
            fail_fast: false,
            max_issues: ExecConfig::default().max_issues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPlan {
    pub allow_unknown_elements: bool,
    pub check_primitive_formats: bool,
}

impl From<&SchemaConfig> for SchemaPlan {
    fn from(cfg: &SchemaConfig) -> Self {
        Self {
            allow_unknown_elements: cfg.allow_unknown_elements,
            check_primitive_formats: cfg.check_primitive_formats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantsPlan {
    pub enabled: bool,
}

impl From<&InvariantsConfig> for InvariantsPlan {
    fn from(cfg: &InvariantsConfig) -> Self {
        Self {
            enabled: cfg.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        let plan = ValidatorConfig::default().compile().unwrap();
        assert!(plan.schema.check_primitive_formats);
        assert!(plan.schema.allow_unknown_elements);
        assert!(plan.invariants.enabled);
        assert_eq!(plan.max_issues, 1000);
        assert_eq!(plan, ValidationPlan::default());
    }

    #[test]
    fn test_structural_preset() {
        let plan = ValidatorConfig::preset(Preset::Structural).compile().unwrap();
        assert!(!plan.schema.check_primitive_formats);
        assert!(!plan.invariants.enabled);
    }

    #[test]
    fn test_builder() {
        let cfg = ValidatorConfig::builder()
            .preset(Preset::Strict)
            .allow_unknown_elements(false)
            .fail_fast(true)
            .max_issues(50)
            .build();

        let plan = cfg.compile().unwrap();
        assert!(!plan.schema.allow_unknown_elements);
        assert!(plan.fail_fast);
        assert_eq!(plan.max_issues, 50);
    }

    #[test]
    fn test_zero_max_issues_is_rejected() {
        let cfg = ValidatorConfig::builder().max_issues(0).build();
        assert!(matches!(cfg.compile(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
preset: Structural
schema:
  allow_unknown_elements: false
exec:
  fail_fast: true
"#;
        let cfg = ValidatorConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.preset, Preset::Structural);
        assert!(!cfg.schema.allow_unknown_elements);
        assert!(!cfg.schema.check_primitive_formats);
        assert!(!cfg.invariants.enabled);
        assert!(cfg.exec.fail_fast);
        assert_eq!(cfg.exec.max_issues, 1000);

        let again = ValidatorConfig::from_yaml(&cfg.to_yaml().unwrap()).unwrap();
        assert_eq!(again, cfg);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validator.yaml");
        std::fs::write(&path, "invariants:\n  enabled: false\n").unwrap();

        let cfg = ValidatorConfig::from_file(&path).unwrap();
        assert!(!cfg.invariants.enabled);

        let missing = ValidatorConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let cfg = ValidatorConfig::from_yaml("").unwrap();
        assert_eq!(cfg, ValidatorConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ValidatorConfig::from_yaml("exec: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }
}
