//! FHIR R5 data types
//!
//! Every type carries the `Element` base (`id`, `extension`); backbone types
//! (`Timing`, `Dosage`, `ElementDefinition`) also carry `modifierExtension`.

mod demographics;
mod element_definition;
mod extension;
mod general;
mod metadata;
mod timing;

pub use demographics::{Address, ContactPoint, HumanName};
pub use element_definition::{
    ElementDefinition, ElementDefinitionBase, ElementDefinitionBinding,
    ElementDefinitionBindingAdditional, ElementDefinitionConstraint, ElementDefinitionDiscriminator,
    ElementDefinitionExample, ElementDefinitionMapping, ElementDefinitionSlicing,
    ElementDefinitionType, OPEN_CHOICE_PREFIXES,
};
pub use extension::Extension;
pub use general::{
    Age, Annotation, Attachment, CodeableConcept, CodeableReference, Coding, Count, Distance,
    Duration, Identifier, Money, MoneyQuantity, Period, Quantity, Range, Ratio, RatioRange,
    Reference, SampledData, Signature, SimpleQuantity, UCUM_SYSTEM,
};
pub use metadata::{
    Availability, AvailabilityAvailableTime, AvailabilityNotAvailableTime, ContactDetail,
    Expression, ExtendedContactDetail, Meta, Narrative, RelatedArtifact, UsageContext,
};
pub use timing::{Dosage, DosageDoseAndRate, Timing, TimingRepeat};

/// True when `key` spells `prefix` followed by a type name
/// (`valueQuantity` for `value`, but not `values` or `_valueQuantity`)
pub(crate) fn is_choice_key(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}
