//! FHIR Encounter resource

use super::Resource;
use crate::r5::codes::{EncounterLocationStatus, EncounterStatus};
use crate::r5::datatypes::{
    CodeableConcept, CodeableReference, Duration, Extension, Identifier, Meta, Narrative, Period,
    Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An interaction between healthcare provider(s), and/or patient(s) for the purpose of providing
/// healthcare service(s) or assessing the health status of patient(s)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Resource type - always "Encounter"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Metadata about the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// A set of rules under which this content was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit_rules: Option<String>,

    /// Language of the resource content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Text summary of the resource, for human interpretation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    /// Contained, inline Resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contained: Option<Vec<Resource>>,

    /// Additional content defined by implementations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Extensions that cannot be ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    pub status: EncounterStatus,

    /// Classification of patient encounter context - e.g. Inpatient, outpatient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<CodeableConcept>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<Vec<CodeableReference>>,

    /// The patient or group related to this encounter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_of_care: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_team: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<EncounterParticipant>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Vec<Reference>>,

    /// The actual start and end time of the encounter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<EncounterReason>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Vec<EncounterDiagnosis>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_preference: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_arrangement: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_courtesy: Option<Vec<CodeableConcept>>,

    /// Details about the admission to a healthcare service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission: Option<EncounterAdmission>,

    /// List of locations where the patient has been
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<EncounterLocation>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Encounter".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterParticipant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterReason {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<CodeableReference>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterDiagnosis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<CodeableReference>>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<Vec<CodeableConcept>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterAdmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_admission_identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admit_source: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_admission: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_disposition: Option<CodeableConcept>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub location: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EncounterLocationStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Encounter {
    pub fn new(status: EncounterStatus) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            implicit_rules: None,
            language: None,
            text: None,
            contained: None,
            extension: None,
            modifier_extension: None,
            identifier: None,
            status,
            class: None,
            priority: None,
            type_: None,
            service_type: None,
            subject: None,
            subject_status: None,
            episode_of_care: None,
            based_on: None,
            care_team: None,
            part_of: None,
            service_provider: None,
            participant: None,
            appointment: None,
            actual_period: None,
            planned_start_date: None,
            planned_end_date: None,
            length: None,
            reason: None,
            diagnosis: None,
            account: None,
            diet_preference: None,
            special_arrangement: None,
            special_courtesy: None,
            admission: None,
            location: None,
            additional: HashMap::new(),
        }
    }

    /// True while the encounter has not reached a terminal status
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            EncounterStatus::Planned | EncounterStatus::InProgress | EncounterStatus::OnHold
        )
    }
}

impl EncounterLocation {
    pub fn new(location: Reference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            location,
            status: None,
            form: None,
            period: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Encounter);

impl Validate for Encounter {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Encounter");
        ctx.each("identifier", &self.identifier);
        ctx.each("class", &self.class);
        ctx.optional("priority", &self.priority);
        ctx.each("type", &self.type_);
        ctx.each("serviceType", &self.service_type);
        ctx.optional("subject", &self.subject);
        ctx.optional("subjectStatus", &self.subject_status);
        ctx.each("episodeOfCare", &self.episode_of_care);
        ctx.each("basedOn", &self.based_on);
        ctx.each("careTeam", &self.care_team);
        ctx.optional("partOf", &self.part_of);
        ctx.optional("serviceProvider", &self.service_provider);
        ctx.each("participant", &self.participant);
        ctx.each("appointment", &self.appointment);
        ctx.optional("actualPeriod", &self.actual_period);
        ctx.date_time("plannedStartDate", self.planned_start_date.as_deref());
        ctx.date_time("plannedEndDate", self.planned_end_date.as_deref());
        ctx.optional("length", &self.length);
        ctx.each("reason", &self.reason);
        ctx.each("diagnosis", &self.diagnosis);
        ctx.each("account", &self.account);
        ctx.each("dietPreference", &self.diet_preference);
        ctx.each("specialArrangement", &self.special_arrangement);
        ctx.each("specialCourtesy", &self.special_courtesy);
        ctx.optional("admission", &self.admission);
        ctx.each("location", &self.location);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for EncounterParticipant {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("type", &self.type_);
        ctx.optional("period", &self.period);
        ctx.optional("actor", &self.actor);

        ctx.invariant(
            "enc-1",
            self.actor.is_some() || self.type_.is_some(),
            "A type must be provided when no explicit actor is specified",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for EncounterReason {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("use", &self.use_);
        ctx.each("value", &self.value);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for EncounterDiagnosis {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("condition", &self.condition);
        ctx.each("use", &self.use_);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for EncounterAdmission {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.optional("preAdmissionIdentifier", &self.pre_admission_identifier);
        ctx.optional("origin", &self.origin);
        ctx.optional("admitSource", &self.admit_source);
        ctx.optional("reAdmission", &self.re_admission);
        ctx.optional("destination", &self.destination);
        ctx.optional("dischargeDisposition", &self.discharge_disposition);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for EncounterLocation {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("location", &self.location);
        ctx.optional("form", &self.form);
        ctx.optional("period", &self.period);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_encounter_parse() {
        let encounter = Encounter::from_value(json!({
            "resourceType": "Encounter",
            "status": "in-progress",
            "class": [{"coding": [{"system": "http://terminology.hl7.org/CodeSystem/v3-ActCode", "code": "IMP"}]}],
            "subject": {"reference": "Patient/example"},
            "location": [{"location": {"reference": "Location/ward-1"}, "status": "active"}]
        }))
        .unwrap();

        assert_eq!(encounter.status, EncounterStatus::InProgress);
        assert!(encounter.is_open());
        assert_eq!(encounter.class.as_ref().unwrap().len(), 1);
        assert!(encounter.validate().valid);
    }

    #[test]
    fn test_participant_needs_actor_or_type() {
        let mut encounter = Encounter::new(EncounterStatus::Completed);
        assert!(!encounter.is_open());
        encounter.participant = Some(vec![EncounterParticipant::default()]);

        let outcome = encounter.validate();
        assert!(!outcome.valid);
        assert!(outcome.issues[0].diagnostics.contains("enc-1"));
    }

    #[test]
    fn test_status_is_required() {
        let result = Encounter::from_value(json!({"resourceType": "Encounter"}));
        assert!(result.is_err());
    }
}
