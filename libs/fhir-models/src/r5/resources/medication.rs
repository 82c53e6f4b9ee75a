//! FHIR Medication resource

use super::Resource;
use crate::r5::codes::MedicationStatus;
use crate::r5::datatypes::{
    CodeableConcept, CodeableReference, Extension, Identifier, Meta, Narrative, Quantity, Ratio,
    Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// This resource is primarily used for the identification and definition of a medication,
/// including ingredients, for the purposes of prescribing, dispensing, and administering a
/// medication as well as for making statements about medication use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Resource type - always "Medication"
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

    /// Codes that identify this medication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MedicationStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_authorization_holder: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_form: Option<CodeableConcept>,

    /// When the specified product code does not infer a package size, this is the specific amount of drug in the product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<Quantity>,

    /// Active or inactive ingredient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<Vec<MedicationIngredient>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<MedicationBatch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Reference>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Medication".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationIngredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    pub item: CodeableReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Quantity of ingredient present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength_ratio: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength_quantity: Option<Quantity>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Details about packaged medications
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationBatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Medication {
    pub fn new() -> Self {
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
            code: None,
            status: None,
            marketing_authorization_holder: None,
            dose_form: None,
            total_volume: None,
            ingredient: None,
            batch: None,
            definition: None,
            additional: HashMap::new(),
        }
    }

    /// Ingredients flagged as active
    pub fn active_ingredients(&self) -> impl Iterator<Item = &MedicationIngredient> {
        self.ingredient
            .iter()
            .flatten()
            .filter(|ingredient| ingredient.is_active == Some(true))
    }
}

impl Default for Medication {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationIngredient {
    pub fn new(item: CodeableReference) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            item,
            is_active: None,
            strength_ratio: None,
            strength_codeable_concept: None,
            strength_quantity: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Medication);

impl Validate for Medication {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Medication");
        ctx.each("identifier", &self.identifier);
        ctx.optional("code", &self.code);
        ctx.optional("marketingAuthorizationHolder", &self.marketing_authorization_holder);
        ctx.optional("doseForm", &self.dose_form);
        ctx.optional("totalVolume", &self.total_volume);
        ctx.each("ingredient", &self.ingredient);
        ctx.optional("batch", &self.batch);
        ctx.optional("definition", &self.definition);

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for MedicationIngredient {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.field("item", &self.item);
        ctx.choice(
            "strength[x]",
            &[
                ("strengthRatio", self.strength_ratio.is_some()),
                ("strengthCodeableConcept", self.strength_codeable_concept.is_some()),
                ("strengthQuantity", self.strength_quantity.is_some()),
            ],
        );
        ctx.optional("strengthRatio", &self.strength_ratio);
        ctx.optional("strengthCodeableConcept", &self.strength_codeable_concept);
        ctx.optional("strengthQuantity", &self.strength_quantity);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for MedicationBatch {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.date_time("expirationDate", self.expiration_date.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    #[test]
    fn test_medication_ingredients() {
        let medication = Medication::from_value(json!({
            "resourceType": "Medication",
            "code": {"text": "Amoxicillin 250mg/5ml Suspension"},
            "ingredient": [
                {
                    "item": {"concept": {"text": "Amoxicillin"}},
                    "isActive": true,
                    "strengthRatio": {
                        "numerator": {"value": 250, "unit": "mg", "system": "http://unitsofmeasure.org", "code": "mg"},
                        "denominator": {"value": 5, "unit": "mL", "system": "http://unitsofmeasure.org", "code": "mL"}
                    }
                },
                {"item": {"concept": {"text": "Water"}}, "isActive": false}
            ],
            "batch": {"lotNumber": "9494788", "expirationDate": "2017-05-22"}
        }))
        .unwrap();

        let active: Vec<_> = medication.active_ingredients().collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].strength_ratio.is_some());
        assert!(medication.validate().valid);
    }

    #[test]
    fn test_ingredient_item_required() {
        let result = Medication::from_value(json!({
            "resourceType": "Medication",
            "ingredient": [{"isActive": true}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_strength_choice() {
        let mut ingredient = MedicationIngredient::new(CodeableReference::default());
        ingredient.strength_quantity = Some(Quantity::ucum(250.0, "mg"));
        ingredient.strength_codeable_concept = Some(CodeableConcept::from_text("qs"));

        let mut medication = Medication::new();
        medication.ingredient = Some(vec![ingredient]);
        let outcome = medication.validate();
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Medication.ingredient[0].strength[x]")
        );
    }
}
