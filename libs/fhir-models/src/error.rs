//! Error types for FHIR models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid FHIR resource: {0}")]
    InvalidResource(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value: {0}")]
    InvalidFieldValue(String),

    #[error("Invalid code '{code}' for {type_name}")]
    InvalidCode {
        type_name: &'static str,
        code: String,
    },

    #[error("Unsupported resource type: {0}")]
    UnknownResourceType(String),

    #[error("Resource type mismatch: expected {expected}, found {found}")]
    ResourceTypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// JSON that does not fit the model. `location` is the element path,
    /// rooted at the resource type, where deserialization gave up.
    #[error("Invalid content at {location}: {message}")]
    InvalidContent { location: String, message: String },

    #[error("Validation failed with {error_count} error(s); first: {first}")]
    Validation { error_count: usize, first: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a validator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
