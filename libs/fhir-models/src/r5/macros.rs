//! Validation of the members every element or resource inherits

/// `Element` base: nested extensions
macro_rules! validate_element {
    ($ctx:expr, $this:expr) => {
        $ctx.each("extension", &$this.extension);
    };
}

/// `BackboneElement` / `BackboneType` base
macro_rules! validate_backbone {
    ($ctx:expr, $this:expr) => {
        $ctx.each("extension", &$this.extension);
        $ctx.each("modifierExtension", &$this.modifier_extension);
    };
}

/// `Resource` base: type marker, id format, meta and language
macro_rules! validate_resource_header {
    ($ctx:expr, $this:expr, $type_name:expr) => {
        $ctx.resource_type(&$this.resource_type, $type_name);
        $ctx.id("id", $this.id.as_deref());
        $ctx.optional("meta", &$this.meta);
        $ctx.uri("implicitRules", $this.implicit_rules.as_deref());
        $ctx.code("language", $this.language.as_deref());
    };
}

/// `DomainResource` base: the resource header plus narrative, contained
/// resources and extensions
macro_rules! validate_domain_resource_header {
    ($ctx:expr, $this:expr, $type_name:expr) => {
        validate_resource_header!($ctx, $this, $type_name);
        $ctx.optional("text", &$this.text);
        $ctx.each("contained", &$this.contained);
        validate_backbone!($ctx, $this);
    };
}

/// Implement [`FhirResource`](crate::r5::resources::FhirResource) for a
/// resource struct carrying the standard header fields
macro_rules! impl_fhir_resource {
    ($ty:ident) => {
        impl $crate::r5::resources::FhirResource for $ty {
            const RESOURCE_TYPE: &'static str = stringify!($ty);

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn meta(&self) -> Option<&$crate::r5::datatypes::Meta> {
                self.meta.as_ref()
            }

            fn additional(&self) -> &std::collections::HashMap<String, serde_json::Value> {
                &self.additional
            }
        }
    };
}
