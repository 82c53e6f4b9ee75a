//! FHIR R5 data models
//!
//! This crate provides strongly-typed Rust structures for FHIR R5 resources
//! and data types, together with a structural validator.
//!
//! # Module Organization
//!
//! - `r5::codes`: enums for the required terminology bindings
//! - `r5::datatypes`: general purpose, metadata and special purpose data types
//! - `r5::resources`: resources, the [`FhirResource`] trait and the [`Resource`] enum
//! - `validation`: the [`Validate`] walk, [`Validator`] and its configuration
//!
//! # Design Philosophy
//!
//! - **Flat records**: every element is a field; `value[x]` choices are one
//!   optional field per allowed type
//! - **Lossless**: unmodelled elements land in an `additional` map and are
//!   written back on serialization
//! - **Validation is separate from parsing**: deserialization only enforces
//!   JSON shape, the validator reports cardinality, choice and format problems
//!
//! # Example
//!
//! ```rust
//! use hearth_models::r5::codes::ObservationStatus;
//! use hearth_models::r5::resources::{FhirResource, Observation};
//! use serde_json::json;
//!
//! let obs = Observation::from_value(json!({
//!     "resourceType": "Observation",
//!     "id": "bp",
//!     "status": "final",
//!     "code": { "text": "Body weight" },
//!     "valueQuantity": { "value": 72.5, "unit": "kg" }
//! }))
//! .unwrap();
//!
//! assert_eq!(obs.status, ObservationStatus::Final);
//! assert!(obs.validate().valid);
//! ```

pub mod error;
pub mod r5;
pub mod validation;

pub use error::{ConfigError, Error, Result};
pub use r5::resources::{FhirResource, Resource};
pub use validation::{
    Preset, Validate, ValidationIssue, ValidationOutcome, Validator, ValidatorConfig,
};
