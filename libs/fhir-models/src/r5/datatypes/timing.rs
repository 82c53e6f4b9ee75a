//! Timing schedules and dosage instructions

use super::{CodeableConcept, Duration, Extension, Period, Quantity, Range, Ratio, SimpleQuantity};
use crate::r5::codes::{DaysOfWeek, UnitsOfTime};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A timing schedule that specifies an event that may occur multiple times
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// When the event occurs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<String>>,

    /// When the event is to occur
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<TimingRepeat>,

    /// C | BID | TID | QID | AM | PM | QD | QOD | +
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Timing {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        for (index, event) in self.event.iter().flatten().enumerate() {
            ctx.date_time(&format!("event[{index}]"), Some(event.as_str()));
        }
        ctx.optional("repeat", &self.repeat);
        ctx.optional("code", &self.code);
        ctx.unknown_elements(&self.additional);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingRepeat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_duration: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_range: Option<Range>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_period: Option<Period>,

    /// Number of times to repeat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Maximum number of times to repeat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_max: Option<u32>,

    /// How long when it happens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<f64>,

    /// s | min | h | d | wk | mo | a - unit of time (UCUM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_unit: Option<UnitsOfTime>,

    /// Indicates the number of repetitions that should occur within a period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_max: Option<u32>,

    /// The duration to which the frequency applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_unit: Option<UnitsOfTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Vec<DaysOfWeek>>,

    /// Time of day for action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<Vec<String>>,

    /// Code for time period of occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<Vec<String>>,

    /// Minutes from event (before or after)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for TimingRepeat {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.choice(
            "bounds[x]",
            &[
                ("boundsDuration", self.bounds_duration.is_some()),
                ("boundsRange", self.bounds_range.is_some()),
                ("boundsPeriod", self.bounds_period.is_some()),
            ],
        );
        ctx.optional("boundsDuration", &self.bounds_duration);
        ctx.optional("boundsRange", &self.bounds_range);
        ctx.optional("boundsPeriod", &self.bounds_period);

        ctx.positive_int("count", self.count);
        ctx.positive_int("countMax", self.count_max);
        ctx.positive_int("frequency", self.frequency);
        ctx.positive_int("frequencyMax", self.frequency_max);
        for (index, time) in self.time_of_day.iter().flatten().enumerate() {
            ctx.time(&format!("timeOfDay[{index}]"), Some(time.as_str()));
        }
        ctx.codes("when", &self.when);

        ctx.invariant(
            "tim-1",
            self.duration.is_none() || self.duration_unit.is_some(),
            "if there's a duration, there needs to be duration units",
        );
        ctx.invariant(
            "tim-2",
            self.period.is_none() || self.period_unit.is_some(),
            "if there's a period, there needs to be period units",
        );
        ctx.invariant(
            "tim-4",
            self.duration.map_or(true, |d| d >= 0.0),
            "duration SHALL be a non-negative value",
        );
        ctx.invariant(
            "tim-5",
            self.period.map_or(true, |p| p >= 0.0),
            "period SHALL be a non-negative value",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// How the medication is/was taken or should be taken
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dosage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// The order of the dosage instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,

    /// Free text dosage instructions e.g. SIG
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instruction: Option<Vec<CodeableConcept>>,

    /// Patient or consumer oriented instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_instruction: Option<String>,

    /// When medication should be administered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,

    /// Take "as needed"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_needed: Option<bool>,

    /// Take "as needed" (for x)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_needed_for: Option<Vec<CodeableConcept>>,

    /// Body site to administer to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<CodeableConcept>,

    /// How drug should enter body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<CodeableConcept>,

    /// Technique for administering medication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<CodeableConcept>,

    /// Amount of medication administered, to be administered or typical amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_and_rate: Option<Vec<DosageDoseAndRate>>,

    /// Upper limit on medication per unit of time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dose_per_period: Option<Vec<Ratio>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dose_per_administration: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dose_per_lifetime: Option<SimpleQuantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for Dosage {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("additionalInstruction", &self.additional_instruction);
        ctx.optional("timing", &self.timing);
        ctx.each("asNeededFor", &self.as_needed_for);
        ctx.optional("site", &self.site);
        ctx.optional("route", &self.route);
        ctx.optional("method", &self.method);
        ctx.each("doseAndRate", &self.dose_and_rate);
        ctx.each("maxDosePerPeriod", &self.max_dose_per_period);
        ctx.optional("maxDosePerAdministration", &self.max_dose_per_administration);
        ctx.optional("maxDosePerLifetime", &self.max_dose_per_lifetime);

        let has_as_needed_for = self.as_needed_for.as_ref().is_some_and(|v| !v.is_empty());
        ctx.invariant(
            "dos-1",
            !(self.as_needed == Some(false) && has_as_needed_for),
            "AsNeededFor can only be set if AsNeeded is empty or true",
        );
        ctx.unknown_elements(&self.additional);
    }
}

/// Amount of medication administered, to be administered or typical amount
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DosageDoseAndRate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// The kind of dose or rate specified
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_range: Option<Range>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_quantity: Option<SimpleQuantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_ratio: Option<Ratio>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_range: Option<Range>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_quantity: Option<Quantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Validate for DosageDoseAndRate {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_element!(ctx, self);
        ctx.optional("type", &self.type_);
        ctx.choice(
            "dose[x]",
            &[
                ("doseRange", self.dose_range.is_some()),
                ("doseQuantity", self.dose_quantity.is_some()),
            ],
        );
        ctx.optional("doseRange", &self.dose_range);
        ctx.optional("doseQuantity", &self.dose_quantity);
        ctx.choice(
            "rate[x]",
            &[
                ("rateRatio", self.rate_ratio.is_some()),
                ("rateRange", self.rate_range.is_some()),
                ("rateQuantity", self.rate_quantity.is_some()),
            ],
        );
        ctx.optional("rateRatio", &self.rate_ratio);
        ctx.optional("rateRange", &self.rate_range);
        ctx.optional("rateQuantity", &self.rate_quantity);
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;
    use serde_json::json;

    #[test]
    fn test_timing_repeat_parses() {
        let timing: Timing = serde_json::from_value(json!({
            "repeat": {
                "boundsPeriod": { "start": "2024-01-01" },
                "frequency": 3,
                "period": 1,
                "periodUnit": "d",
                "dayOfWeek": ["mon", "wed"]
            }
        }))
        .unwrap();
        let repeat = timing.repeat.as_ref().unwrap();
        assert_eq!(repeat.period_unit, Some(UnitsOfTime::Day));
        assert_eq!(repeat.day_of_week.as_ref().unwrap()[1], DaysOfWeek::Wed);
        assert!(Validator::default().validate_element("Timing", &timing).valid);
    }

    #[test]
    fn test_timing_repeat_bounds_is_single_choice() {
        let repeat = TimingRepeat {
            bounds_duration: Some(Quantity::new(10.0, "d")),
            bounds_period: Some(Period::new(Some("2024-01-01"), None)),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("TimingRepeat", &repeat);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("TimingRepeat.bounds[x]")
        );
    }

    #[test]
    fn test_period_needs_unit() {
        let repeat = TimingRepeat {
            frequency: Some(2),
            period: Some(1.0),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("TimingRepeat", &repeat);
        assert!(outcome.issues[0].diagnostics.contains("tim-2"));
    }

    #[test]
    fn test_duration_needs_unit() {
        let validator = Validator::default();

        let bare = TimingRepeat {
            duration: Some(30.0),
            ..Default::default()
        };
        let outcome = validator.validate_element("TimingRepeat", &bare);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].diagnostics.contains("tim-1"));

        let with_unit = TimingRepeat {
            duration: Some(30.0),
            duration_unit: Some(UnitsOfTime::Minute),
            ..Default::default()
        };
        assert!(validator.validate_element("TimingRepeat", &with_unit).valid);
    }

    #[test]
    fn test_dose_and_rate_choices() {
        let dose = DosageDoseAndRate {
            dose_quantity: Some(Quantity::new(1.0, "tablet")),
            dose_range: Some(Range::default()),
            rate_quantity: Some(Quantity::new(5.0, "mL/h")),
            ..Default::default()
        };
        let dosage = Dosage {
            dose_and_rate: Some(vec![dose]),
            ..Default::default()
        };
        let outcome = Validator::default().validate_element("Dosage", &dosage);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Dosage.doseAndRate[0].dose[x]")
        );
    }
}
