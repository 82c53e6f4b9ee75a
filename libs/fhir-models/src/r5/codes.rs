//! Code tables for the required terminology bindings used by the R5 models
//!
//! Each enum serializes to the exact FHIR code string. Only bindings with
//! `required` strength are modelled here; extensible and preferred bindings
//! stay as `String` or `CodeableConcept` on the owning element.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a code enum with serde, `as_str`, `ALL`, `Display` and `FromStr`.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $code:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant, )+
        }

        impl $name {
            /// Every code in the value set, in definition order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The FHIR code string
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $code, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $code => Ok($name::$variant), )+
                    other => Err(Error::InvalidCode {
                        type_name: stringify!($name),
                        code: other.to_string(),
                    }),
                }
            }
        }
    };
}

// ============================================================================
// Foundation
// ============================================================================

code_enum! {
    /// Lifecycle status of a canonical resource
    PublicationStatus {
        Draft => "draft",
        Active => "active",
        Retired => "retired",
        Unknown => "unknown",
    }
}

code_enum! {
    /// How an issue affects the success of an action
    IssueSeverity {
        Fatal => "fatal",
        Error => "error",
        Warning => "warning",
        Information => "information",
        Success => "success",
    }
}

code_enum! {
    /// Type of an OperationOutcome issue
    IssueType {
        Invalid => "invalid",
        Structure => "structure",
        Required => "required",
        Value => "value",
        Invariant => "invariant",
        Security => "security",
        Login => "login",
        Unknown => "unknown",
        Expired => "expired",
        Forbidden => "forbidden",
        Suppressed => "suppressed",
        Processing => "processing",
        NotSupported => "not-supported",
        Duplicate => "duplicate",
        MultipleMatches => "multiple-matches",
        NotFound => "not-found",
        Deleted => "deleted",
        TooLong => "too-long",
        CodeInvalid => "code-invalid",
        Extension => "extension",
        TooCostly => "too-costly",
        BusinessRule => "business-rule",
        Conflict => "conflict",
        LimitedMatch => "limited-match",
        Transient => "transient",
        LockError => "lock-error",
        NoStore => "no-store",
        Exception => "exception",
        Timeout => "timeout",
        Incomplete => "incomplete",
        Throttled => "throttled",
        Informational => "informational",
        Success => "success",
    }
}

code_enum! {
    /// Purpose of a Bundle
    BundleType {
        Document => "document",
        Message => "message",
        Transaction => "transaction",
        TransactionResponse => "transaction-response",
        Batch => "batch",
        BatchResponse => "batch-response",
        History => "history",
        Searchset => "searchset",
        Collection => "collection",
        SubscriptionNotification => "subscription-notification",
    }
}

code_enum! {
    /// HTTP verb used in a Bundle entry request
    HttpVerb {
        Get => "GET",
        Head => "HEAD",
        Post => "POST",
        Put => "PUT",
        Delete => "DELETE",
        Patch => "PATCH",
    }
}

code_enum! {
    /// Why an entry is in a search result set
    SearchEntryMode {
        Match => "match",
        Include => "include",
        Outcome => "outcome",
    }
}

code_enum! {
    /// Status of a Narrative
    NarrativeStatus {
        Generated => "generated",
        Extensions => "extensions",
        Additional => "additional",
        Empty => "empty",
    }
}

// ============================================================================
// Data types
// ============================================================================

code_enum! {
    AdministrativeGender {
        Male => "male",
        Female => "female",
        Other => "other",
        Unknown => "unknown",
    }
}

code_enum! {
    NameUse {
        Usual => "usual",
        Official => "official",
        Temp => "temp",
        Nickname => "nickname",
        Anonymous => "anonymous",
        Old => "old",
        Maiden => "maiden",
    }
}

code_enum! {
    AddressUse {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Billing => "billing",
    }
}

code_enum! {
    AddressType {
        Postal => "postal",
        Physical => "physical",
        Both => "both",
    }
}

code_enum! {
    ContactPointSystem {
        Phone => "phone",
        Fax => "fax",
        Email => "email",
        Pager => "pager",
        Url => "url",
        Sms => "sms",
        Other => "other",
    }
}

code_enum! {
    ContactPointUse {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Mobile => "mobile",
    }
}

code_enum! {
    IdentifierUse {
        Usual => "usual",
        Official => "official",
        Temp => "temp",
        Secondary => "secondary",
        Old => "old",
    }
}

code_enum! {
    /// How a Quantity value should be interpreted relative to the real value
    QuantityComparator {
        LessThan => "<",
        LessOrEqual => "<=",
        GreaterOrEqual => ">=",
        GreaterThan => ">",
        /// Sufficient to achieve this total quantity
        Ad => "ad",
    }
}

code_enum! {
    DaysOfWeek {
        Mon => "mon",
        Tue => "tue",
        Wed => "wed",
        Thu => "thu",
        Fri => "fri",
        Sat => "sat",
        Sun => "sun",
    }
}

code_enum! {
    UnitsOfTime {
        Second => "s",
        Minute => "min",
        Hour => "h",
        Day => "d",
        Week => "wk",
        Month => "mo",
        Year => "a",
    }
}

code_enum! {
    RelatedArtifactType {
        Documentation => "documentation",
        Justification => "justification",
        Citation => "citation",
        Predecessor => "predecessor",
        Successor => "successor",
        DerivedFrom => "derived-from",
        DependsOn => "depends-on",
        ComposedOf => "composed-of",
        PartOf => "part-of",
        Amends => "amends",
        AmendedWith => "amended-with",
        Appends => "appends",
        AppendedWith => "appended-with",
        Cites => "cites",
        CitedBy => "cited-by",
        CommentsOn => "comments-on",
        CommentIn => "comment-in",
        Contains => "contains",
        ContainedIn => "contained-in",
        Corrects => "corrects",
        CorrectionIn => "correction-in",
        Replaces => "replaces",
        ReplacedWith => "replaced-with",
        Retracts => "retracts",
        RetractedBy => "retracted-by",
        Signs => "signs",
        SimilarTo => "similar-to",
        Supports => "supports",
        SupportedWith => "supported-with",
        Transforms => "transforms",
        TransformedInto => "transformed-into",
        TransformedWith => "transformed-with",
        Documents => "documents",
        SpecificationOf => "specification-of",
        CreatedWith => "created-with",
        CiteAs => "cite-as",
    }
}

// ============================================================================
// Conformance
// ============================================================================

code_enum! {
    /// Kind of structure a StructureDefinition defines
    StructureDefinitionKind {
        PrimitiveType => "primitive-type",
        ComplexType => "complex-type",
        Resource => "resource",
        Logical => "logical",
    }
}

code_enum! {
    /// How a type relates to its baseDefinition
    TypeDerivationRule {
        Specialization => "specialization",
        Constraint => "constraint",
    }
}

code_enum! {
    ExtensionContextType {
        Fhirpath => "fhirpath",
        Element => "element",
        Extension => "extension",
    }
}

code_enum! {
    /// How a property is represented when serialized
    PropertyRepresentation {
        XmlAttr => "xmlAttr",
        XmlText => "xmlText",
        TypeAttr => "typeAttr",
        CdaText => "cdaText",
        Xhtml => "xhtml",
    }
}

code_enum! {
    /// How aggregated references are handled
    AggregationMode {
        Contained => "contained",
        Referenced => "referenced",
        Bundled => "bundled",
    }
}

code_enum! {
    ReferenceVersionRules {
        Either => "either",
        Independent => "independent",
        Specific => "specific",
    }
}

code_enum! {
    BindingStrength {
        Required => "required",
        Extensible => "extensible",
        Preferred => "preferred",
        Example => "example",
    }
}

code_enum! {
    ConstraintSeverity {
        Error => "error",
        Warning => "warning",
    }
}

code_enum! {
    SlicingRules {
        Closed => "closed",
        Open => "open",
        OpenAtEnd => "openAtEnd",
    }
}

code_enum! {
    DiscriminatorType {
        Value => "value",
        Exists => "exists",
        Pattern => "pattern",
        Type => "type",
        Profile => "profile",
        Position => "position",
    }
}

// ============================================================================
// Terminology
// ============================================================================

code_enum! {
    CodeSystemContentMode {
        NotPresent => "not-present",
        Example => "example",
        Fragment => "fragment",
        Complete => "complete",
        Supplement => "supplement",
    }
}

code_enum! {
    CodeSystemHierarchyMeaning {
        GroupedBy => "grouped-by",
        IsA => "is-a",
        PartOf => "part-of",
        ClassifiedWith => "classified-with",
    }
}

code_enum! {
    FilterOperator {
        Equal => "=",
        IsA => "is-a",
        DescendentOf => "descendent-of",
        IsNotA => "is-not-a",
        Regex => "regex",
        In => "in",
        NotIn => "not-in",
        Generalizes => "generalizes",
        ChildOf => "child-of",
        DescendentLeaf => "descendent-leaf",
        Exists => "exists",
    }
}

code_enum! {
    /// Type of a CodeSystem concept property
    PropertyType {
        Code => "code",
        Coding => "Coding",
        String => "string",
        Integer => "integer",
        Boolean => "boolean",
        DateTime => "dateTime",
        Decimal => "decimal",
    }
}

// ============================================================================
// Administration
// ============================================================================

code_enum! {
    /// Type of link between two Patient resources
    LinkType {
        ReplacedBy => "replaced-by",
        Replaces => "replaces",
        Refer => "refer",
        SeeAlso => "seealso",
    }
}

code_enum! {
    LocationStatus {
        Active => "active",
        Suspended => "suspended",
        Inactive => "inactive",
    }
}

code_enum! {
    LocationMode {
        Instance => "instance",
        Kind => "kind",
    }
}

code_enum! {
    EncounterStatus {
        Planned => "planned",
        InProgress => "in-progress",
        OnHold => "on-hold",
        Discharged => "discharged",
        Completed => "completed",
        Cancelled => "cancelled",
        Discontinued => "discontinued",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

code_enum! {
    EncounterLocationStatus {
        Planned => "planned",
        Active => "active",
        Reserved => "reserved",
        Completed => "completed",
    }
}

code_enum! {
    DeviceStatus {
        Active => "active",
        Inactive => "inactive",
        EnteredInError => "entered-in-error",
    }
}

code_enum! {
    DeviceNameType {
        RegisteredName => "registered-name",
        UserFriendlyName => "user-friendly-name",
        PatientReportedName => "patient-reported-name",
    }
}

code_enum! {
    UdiEntryType {
        Barcode => "barcode",
        Rfid => "rfid",
        Manual => "manual",
        Card => "card",
        SelfReported => "self-reported",
        ElectronicTransmission => "electronic-transmission",
        Unknown => "unknown",
    }
}

// ============================================================================
// Clinical
// ============================================================================

code_enum! {
    ObservationStatus {
        Registered => "registered",
        Preliminary => "preliminary",
        Final => "final",
        Amended => "amended",
        Corrected => "corrected",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

code_enum! {
    /// Why an observation was triggered by another
    TriggeredByType {
        Reflex => "reflex",
        Repeat => "repeat",
        ReRun => "re-run",
    }
}

code_enum! {
    /// Status of an event (Procedure and friends)
    EventStatus {
        Preparation => "preparation",
        InProgress => "in-progress",
        NotDone => "not-done",
        OnHold => "on-hold",
        Stopped => "stopped",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

code_enum! {
    AllergyIntoleranceCategory {
        Food => "food",
        Medication => "medication",
        Environment => "environment",
        Biologic => "biologic",
    }
}

code_enum! {
    AllergyIntoleranceCriticality {
        Low => "low",
        High => "high",
        UnableToAssess => "unable-to-assess",
    }
}

code_enum! {
    AllergyIntoleranceSeverity {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
    }
}

code_enum! {
    /// Status of a request (CarePlan, ServiceRequest)
    RequestStatus {
        Draft => "draft",
        Active => "active",
        OnHold => "on-hold",
        Revoked => "revoked",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

code_enum! {
    /// Level of authority of a request
    RequestIntent {
        Proposal => "proposal",
        Plan => "plan",
        Directive => "directive",
        Order => "order",
        OriginalOrder => "original-order",
        ReflexOrder => "reflex-order",
        FillerOrder => "filler-order",
        InstanceOrder => "instance-order",
        Option => "option",
    }
}

code_enum! {
    RequestPriority {
        Routine => "routine",
        Urgent => "urgent",
        Asap => "asap",
        Stat => "stat",
    }
}

code_enum! {
    CarePlanIntent {
        Proposal => "proposal",
        Plan => "plan",
        Order => "order",
        Option => "option",
        Directive => "directive",
    }
}

code_enum! {
    CareTeamStatus {
        Proposed => "proposed",
        Active => "active",
        Suspended => "suspended",
        Inactive => "inactive",
        EnteredInError => "entered-in-error",
    }
}

code_enum! {
    GoalLifecycleStatus {
        Proposed => "proposed",
        Planned => "planned",
        Accepted => "accepted",
        Active => "active",
        OnHold => "on-hold",
        Completed => "completed",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
        Rejected => "rejected",
    }
}

code_enum! {
    DiagnosticReportStatus {
        Registered => "registered",
        Partial => "partial",
        Preliminary => "preliminary",
        Modified => "modified",
        Final => "final",
        Amended => "amended",
        Corrected => "corrected",
        Appended => "appended",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

code_enum! {
    ImmunizationStatus {
        Completed => "completed",
        EnteredInError => "entered-in-error",
        NotDone => "not-done",
    }
}

code_enum! {
    MedicationStatus {
        Active => "active",
        Inactive => "inactive",
        EnteredInError => "entered-in-error",
    }
}

code_enum! {
    MedicationRequestStatus {
        Active => "active",
        OnHold => "on-hold",
        Ended => "ended",
        Stopped => "stopped",
        Completed => "completed",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
        Draft => "draft",
        Unknown => "unknown",
    }
}

code_enum! {
    MedicationRequestIntent {
        Proposal => "proposal",
        Plan => "plan",
        Order => "order",
        OriginalOrder => "original-order",
        ReflexOrder => "reflex-order",
        FillerOrder => "filler-order",
        InstanceOrder => "instance-order",
        Option => "option",
    }
}

code_enum! {
    MedicationStatementStatus {
        Recorded => "recorded",
        EnteredInError => "entered-in-error",
        Draft => "draft",
    }
}

code_enum! {
    SpecimenStatus {
        Available => "available",
        Unavailable => "unavailable",
        Unsatisfactory => "unsatisfactory",
        EnteredInError => "entered-in-error",
    }
}

code_enum! {
    SpecimenCombined {
        Grouped => "grouped",
        Pooled => "pooled",
    }
}

code_enum! {
    DocumentReferenceStatus {
        Current => "current",
        Superseded => "superseded",
        EnteredInError => "entered-in-error",
    }
}

code_enum! {
    /// Workflow status of a composition or document
    CompositionStatus {
        Registered => "registered",
        Partial => "partial",
        Preliminary => "preliminary",
        Final => "final",
        Amended => "amended",
        Corrected => "corrected",
        Appended => "appended",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
        Deprecated => "deprecated",
        Unknown => "unknown",
    }
}

code_enum! {
    QuestionnaireItemType {
        Group => "group",
        Display => "display",
        Question => "question",
        Boolean => "boolean",
        Decimal => "decimal",
        Integer => "integer",
        Date => "date",
        DateTime => "dateTime",
        Time => "time",
        String => "string",
        Text => "text",
        Url => "url",
        Coding => "coding",
        Attachment => "attachment",
        Reference => "reference",
        Quantity => "quantity",
    }
}

code_enum! {
    QuestionnaireItemOperator {
        Exists => "exists",
        Equal => "=",
        NotEqual => "!=",
        GreaterThan => ">",
        LessThan => "<",
        GreaterOrEqual => ">=",
        LessOrEqual => "<=",
    }
}

code_enum! {
    EnableWhenBehavior {
        All => "all",
        Any => "any",
    }
}

code_enum! {
    QuestionnaireItemDisabledDisplay {
        Hidden => "hidden",
        Protected => "protected",
    }
}

code_enum! {
    QuestionnaireAnswerConstraint {
        OptionsOnly => "optionsOnly",
        OptionsOrType => "optionsOrType",
        OptionsOrString => "optionsOrString",
    }
}

code_enum! {
    QuestionnaireResponseStatus {
        InProgress => "in-progress",
        Completed => "completed",
        Amended => "amended",
        EnteredInError => "entered-in-error",
        Stopped => "stopped",
    }
}

code_enum! {
    ProvenanceEntityRole {
        Revision => "revision",
        Quotation => "quotation",
        Source => "source",
        Instantiates => "instantiates",
        Removal => "removal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_to_fhir_string() {
        let json = serde_json::to_value(ObservationStatus::EnteredInError).unwrap();
        assert_eq!(json, "entered-in-error");

        let json = serde_json::to_value(QuantityComparator::LessOrEqual).unwrap();
        assert_eq!(json, "<=");
    }

    #[test]
    fn test_code_deserializes_from_fhir_string() {
        let status: BundleType = serde_json::from_str("\"transaction-response\"").unwrap();
        assert_eq!(status, BundleType::TransactionResponse);

        let verb: HttpVerb = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(verb, HttpVerb::Patch);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let result: Result<AdministrativeGender, _> = serde_json::from_str("\"invalid_gender\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_str_and_display() {
        let kind: StructureDefinitionKind = "complex-type".parse().unwrap();
        assert_eq!(kind, StructureDefinitionKind::ComplexType);
        assert_eq!(kind.to_string(), "complex-type");

        let err = "bogus".parse::<SlicingRules>().unwrap_err();
        match err {
            Error::InvalidCode { type_name, code } => {
                assert_eq!(type_name, "SlicingRules");
                assert_eq!(code, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_table_round_trips_through_from_str() {
        for status in EncounterStatus::ALL {
            assert_eq!(status.as_str().parse::<EncounterStatus>().unwrap(), *status);
        }
        assert_eq!(IssueSeverity::ALL.len(), 5);
    }
}
