//! FHIR R5 models

#[macro_use]
mod macros;

pub mod codes;
pub mod datatypes;
pub mod resources;
