use super::primitives::Primitive;
use super::{Validate, ValidationIssue, ValidationPlan};
use crate::r5::codes::IssueType;
use serde_json::Value;
use std::collections::HashMap;

/// State of one validation walk: the element path being visited and the
/// issues collected so far.
///
/// Paths use FHIRPath-like notation: `Observation.component[1].code`. Choice
/// groups are reported at their `[x]` name (`Observation.value[x]`).
pub struct ValidationContext<'a> {
    plan: &'a ValidationPlan,
    path: Vec<String>,
    issues: Vec<ValidationIssue>,
    halted: bool,
}

impl<'a> ValidationContext<'a> {
    pub fn new(plan: &'a ValidationPlan, root: impl Into<String>) -> Self {
        Self {
            plan,
            path: vec![root.into()],
            issues: Vec::new(),
            halted: false,
        }
    }

    pub fn plan(&self) -> &ValidationPlan {
        self.plan
    }

    /// Current element path
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    /// True once `fail_fast` tripped or `max_issues` was reached
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn location(&self, name: &str) -> String {
        format!("{}.{}", self.path(), name)
    }

    pub fn report(&mut self, issue: ValidationIssue) {
        if self.halted {
            return;
        }

        let is_error = issue.is_error();
        self.issues.push(issue);

        if self.issues.len() >= self.plan.max_issues || (self.plan.fail_fast && is_error) {
            self.halted = true;
        }
    }

    /// Report an error against the child element `name`
    pub fn error_at(&mut self, name: &str, code: IssueType, diagnostics: impl Into<String>) {
        let location = self.location(name);
        self.report(
            ValidationIssue::error(code, diagnostics.into())
                .with_location(location.clone())
                .with_expression(vec![location]),
        );
    }

    /// Report a warning against the child element `name`
    pub fn warning_at(&mut self, name: &str, code: IssueType, diagnostics: impl Into<String>) {
        let location = self.location(name);
        self.report(
            ValidationIssue::warning(code, diagnostics.into())
                .with_location(location.clone())
                .with_expression(vec![location]),
        );
    }

    /// Run `f` with `segment` appended to the current path
    pub fn within(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self)) {
        if self.halted {
            return;
        }
        self.path.push(segment.into());
        f(self);
        self.path.pop();
    }

    // ------------------------------------------------------------------
    // Recursion
    // ------------------------------------------------------------------

    /// Validate a child element that is always present
    pub fn field<T: Validate + ?Sized>(&mut self, name: &str, value: &T) {
        self.within(name.to_string(), |ctx| value.validate_into(ctx));
    }

    /// Validate an optional child element when present
    pub fn optional<T: Validate>(&mut self, name: &str, value: &Option<T>) {
        if let Some(value) = value {
            self.field(name, value);
        }
    }

    /// Validate every item of an optional repeating element
    pub fn each<T: Validate>(&mut self, name: &str, values: &Option<Vec<T>>) {
        if let Some(values) = values {
            self.items(name, values);
        }
    }

    /// Validate every item of a repeating element, naming each by index
    pub fn items<T: Validate>(&mut self, name: &str, values: &[T]) {
        for (index, value) in values.iter().enumerate() {
            self.within(format!("{name}[{index}]"), |ctx| value.validate_into(ctx));
        }
    }

    /// A `1..*` element: must be non-empty, then every item is validated
    pub fn required_each<T: Validate>(&mut self, name: &str, values: &[T]) {
        if values.is_empty() {
            self.error_at(
                name,
                IssueType::Required,
                format!("Missing required element '{name}' (minimum cardinality 1)"),
            );
            return;
        }
        self.items(name, values);
    }

    // ------------------------------------------------------------------
    // Presence
    // ------------------------------------------------------------------

    /// A `1..1` string-shaped element must carry non-whitespace content
    pub fn required_str(&mut self, name: &str, value: &str) {
        if value.trim().is_empty() {
            self.error_at(
                name,
                IssueType::Required,
                format!("Missing required element '{name}'"),
            );
        }
    }

    /// A `1..*` primitive list must have at least one entry
    pub fn required_values<T>(&mut self, name: &str, values: &[T]) {
        if values.is_empty() {
            self.error_at(
                name,
                IssueType::Required,
                format!("Missing required element '{name}' (minimum cardinality 1)"),
            );
        }
    }

    /// At most one variant of a `[x]` choice group may be populated
    pub fn choice(&mut self, name: &str, variants: &[(&str, bool)]) {
        self.check_choice(name, variants, false);
    }

    /// Exactly one variant of a `[x]` choice group must be populated
    pub fn required_choice(&mut self, name: &str, variants: &[(&str, bool)]) {
        self.check_choice(name, variants, true);
    }

    fn check_choice(&mut self, name: &str, variants: &[(&str, bool)], required: bool) {
        let present: Vec<&str> = variants
            .iter()
            .filter(|(_, is_present)| *is_present)
            .map(|(variant, _)| *variant)
            .collect();

        match present.len() {
            0 if required => {
                let allowed: Vec<&str> = variants.iter().map(|(variant, _)| *variant).collect();
                self.error_at(
                    name,
                    IssueType::Required,
                    format!(
                        "Missing required element '{name}': one of {} must be present",
                        allowed.join(", ")
                    ),
                );
            }
            0 | 1 => {}
            _ => {
                self.error_at(
                    name,
                    IssueType::Structure,
                    format!(
                        "Only one of {} may be present for '{name}'",
                        present.join(", ")
                    ),
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Resource-level checks
    // ------------------------------------------------------------------

    pub fn resource_type(&mut self, found: &str, expected: &str) {
        if found != expected {
            self.error_at(
                "resourceType",
                IssueType::Invalid,
                format!("Expected resourceType '{expected}', found '{found}'"),
            );
        }
    }

    /// Report elements captured by a catch-all map. `_name` keys hold
    /// primitive extensions and are not reported.
    pub fn unknown_elements(&mut self, additional: &HashMap<String, Value>) {
        let mut unknown: Vec<&String> = additional
            .keys()
            .filter(|key| !key.starts_with('_'))
            .collect();
        unknown.sort();

        for key in unknown {
            let diagnostics = format!("Unrecognized element '{key}'");
            if self.plan.schema.allow_unknown_elements {
                self.warning_at(key, IssueType::Structure, diagnostics);
            } else {
                self.error_at(key, IssueType::Structure, diagnostics);
            }
        }
    }

    /// Check a FHIR invariant when invariant checking is enabled
    pub fn invariant(&mut self, key: &str, holds: bool, human: &str) {
        if !self.plan.invariants.enabled || holds {
            return;
        }
        let path = self.path();
        self.report(
            ValidationIssue::error(IssueType::Invariant, format!("Constraint failed: {key}: {human}"))
                .with_location(path.clone())
                .with_expression(vec![path]),
        );
    }

    // ------------------------------------------------------------------
    // Primitive formats
    // ------------------------------------------------------------------

    fn format(&mut self, name: &str, value: Option<&str>, primitive: Primitive) {
        if !self.plan.schema.check_primitive_formats {
            return;
        }
        if let Some(value) = value {
            if !primitive.is_valid(value) {
                self.error_at(
                    name,
                    IssueType::Value,
                    format!("'{value}' is not a valid {}", primitive.name()),
                );
            }
        }
    }

    pub fn id(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Id);
    }

    pub fn code(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Code);
    }

    pub fn uri(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Uri);
    }

    pub fn date(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Date);
    }

    pub fn date_time(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::DateTime);
    }

    pub fn instant(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Instant);
    }

    pub fn time(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Time);
    }

    pub fn oid(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Oid);
    }

    pub fn uuid(&mut self, name: &str, value: Option<&str>) {
        self.format(name, value, Primitive::Uuid);
    }

    /// `positiveInt` values must be at least 1
    pub fn positive_int(&mut self, name: &str, value: Option<u32>) {
        if !self.plan.schema.check_primitive_formats {
            return;
        }
        if value == Some(0) {
            self.error_at(name, IssueType::Value, "positiveInt must be at least 1");
        }
    }

    /// Each item of a repeating code element
    pub fn codes(&mut self, name: &str, values: &Option<Vec<String>>) {
        for (index, value) in values.iter().flatten().enumerate() {
            self.format(&format!("{name}[{index}]"), Some(value.as_str()), Primitive::Code);
        }
    }

    /// Each item of a repeating uri/canonical element
    pub fn uris(&mut self, name: &str, values: &Option<Vec<String>>) {
        for (index, value) in values.iter().flatten().enumerate() {
            self.format(&format!("{name}[{index}]"), Some(value.as_str()), Primitive::Uri);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Preset, ValidatorConfig};

    struct Leaf {
        name: String,
    }

    impl Validate for Leaf {
        fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
            ctx.required_str("name", &self.name);
        }
    }

    #[test]
    fn test_paths_track_nesting() {
        let plan = ValidationPlan::default();
        let mut ctx = ValidationContext::new(&plan, "Thing");
        let leaves = vec![
            Leaf {
                name: "ok".to_string(),
            },
            Leaf {
                name: "  ".to_string(),
            },
        ];
        ctx.items("leaf", &leaves);

        let issues = ctx.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location.as_deref(), Some("Thing.leaf[1].name"));
        assert_eq!(issues[0].code, IssueType::Required);
    }

    #[test]
    fn test_required_each_reports_empty_list() {
        let plan = ValidationPlan::default();
        let mut ctx = ValidationContext::new(&plan, "Thing");
        ctx.required_each::<Leaf>("leaf", &[]);
        assert_eq!(ctx.issues()[0].location.as_deref(), Some("Thing.leaf"));
    }

    #[test]
    fn test_choice_rules() {
        let plan = ValidationPlan::default();
        let mut ctx = ValidationContext::new(&plan, "Thing");

        ctx.choice("value[x]", &[("valueString", false), ("valueBoolean", false)]);
        assert!(ctx.issues().is_empty());

        ctx.choice("value[x]", &[("valueString", true), ("valueBoolean", true)]);
        assert_eq!(ctx.issues().len(), 1);
        assert_eq!(ctx.issues()[0].code, IssueType::Structure);
        assert!(ctx.issues()[0].diagnostics.contains("valueString, valueBoolean"));

        ctx.required_choice("value[x]", &[("valueString", false), ("valueBoolean", false)]);
        assert_eq!(ctx.issues().len(), 2);
        assert_eq!(ctx.issues()[1].code, IssueType::Required);
        assert_eq!(ctx.issues()[1].location.as_deref(), Some("Thing.value[x]"));
    }

    #[test]
    fn test_fail_fast_stops_after_first_error() {
        let plan = ValidatorConfig::builder()
            .fail_fast(true)
            .build()
            .compile()
            .unwrap();
        let mut ctx = ValidationContext::new(&plan, "Thing");
        ctx.required_str("a", "");
        ctx.required_str("b", "");
        assert!(ctx.is_halted());
        assert_eq!(ctx.issues().len(), 1);
    }

    #[test]
    fn test_max_issues_caps_collection() {
        let plan = ValidatorConfig::builder()
            .max_issues(2)
            .build()
            .compile()
            .unwrap();
        let mut ctx = ValidationContext::new(&plan, "Thing");
        for name in ["a", "b", "c", "d"] {
            ctx.required_str(name, "");
        }
        assert_eq!(ctx.issues().len(), 2);
    }

    #[test]
    fn test_formats_respect_plan() {
        let strict = ValidationPlan::default();
        let mut ctx = ValidationContext::new(&strict, "Thing");
        ctx.date("date", Some("yesterday"));
        ctx.positive_int("count", Some(0));
        assert_eq!(ctx.issues().len(), 2);

        let structural = ValidatorConfig::preset(Preset::Structural).compile().unwrap();
        let mut ctx = ValidationContext::new(&structural, "Thing");
        ctx.date("date", Some("yesterday"));
        ctx.invariant("xyz-1", false, "never holds");
        assert!(ctx.issues().is_empty());
    }

    #[test]
    fn test_unknown_elements_severity() {
        let mut additional = HashMap::new();
        additional.insert("_birthDate".to_string(), Value::Null);
        additional.insert("madeUp".to_string(), Value::Bool(true));

        let lenient = ValidationPlan::default();
        let mut ctx = ValidationContext::new(&lenient, "Patient");
        ctx.unknown_elements(&additional);
        assert_eq!(ctx.issues().len(), 1);
        assert!(!ctx.issues()[0].is_error());
        assert_eq!(ctx.issues()[0].location.as_deref(), Some("Patient.madeUp"));

        let strict = ValidatorConfig::builder()
            .allow_unknown_elements(false)
            .build()
            .compile()
            .unwrap();
        let mut ctx = ValidationContext::new(&strict, "Patient");
        ctx.unknown_elements(&additional);
        assert!(ctx.issues()[0].is_error());
    }
}
