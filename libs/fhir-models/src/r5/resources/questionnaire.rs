//! FHIR Questionnaire resource

use super::Resource;
use crate::r5::codes::{
    EnableWhenBehavior, PublicationStatus, QuestionnaireAnswerConstraint,
    QuestionnaireItemDisabledDisplay, QuestionnaireItemOperator, QuestionnaireItemType,
};
use crate::r5::datatypes::{
    Attachment, CodeableConcept, Coding, ContactDetail, Extension, Identifier, Meta, Narrative,
    Period, Quantity, Reference, UsageContext,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A structured set of questions intended to guide the collection of answers from end-users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    /// Resource type - always "Questionnaire"
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

    /// Canonical identifier for this resource, represented as an absolute URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// Business version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_algorithm_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_algorithm_coding: Option<Coding>,

    /// Name for this resource (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Vec<String>>,

    /// draft | active | retired | unknown
    pub status: PublicationStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,

    /// Resource types that can be subject of a QuestionnaireResponse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ContactDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_context: Option<Vec<UsageContext>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright_label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,

    /// Concept that represents the overall questionnaire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<Coding>>,

    /// Questions and sections within the Questionnaire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<QuestionnaireItem>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Questionnaire".to_string()
}

/// A group, question or display text within a Questionnaire. Items nest to any depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Unique id for item in questionnaire
    pub link_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<Coding>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Primary text for the item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "type")]
    pub type_: QuestionnaireItemType,

    /// Only allow data when
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_when: Option<Vec<QuestionnaireItemEnableWhen>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_behavior: Option<EnableWhenBehavior>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_display: Option<QuestionnaireItemDisabledDisplay>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeats: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_constraint: Option<QuestionnaireAnswerConstraint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_value_set: Option<String>,

    /// Permitted answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_option: Option<Vec<QuestionnaireItemAnswerOption>>,

    /// Initial value(s) when item is first rendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<Vec<QuestionnaireItemInitial>>,

    /// Nested questionnaire items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<QuestionnaireItem>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireItemEnableWhen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// The linkId of the question that determines whether item is enabled/disabled
    pub question: String,

    pub operator: QuestionnaireItemOperator,

    /// Value for question comparison based on operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_decimal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_reference: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireItemAnswerOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Answer value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_selected: Option<bool>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireItemInitial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Actual value for initializing the question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_decimal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Questionnaire {
    pub fn new(status: PublicationStatus) -> Self {
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
            url: None,
            identifier: None,
            version: None,
            version_algorithm_string: None,
            version_algorithm_coding: None,
            name: None,
            title: None,
            derived_from: None,
            status,
            experimental: None,
            subject_type: None,
            date: None,
            publisher: None,
            contact: None,
            description: None,
            use_context: None,
            jurisdiction: None,
            purpose: None,
            copyright: None,
            copyright_label: None,
            approval_date: None,
            last_review_date: None,
            effective_period: None,
            code: None,
            item: None,
            additional: HashMap::new(),
        }
    }

    /// Find an item by `linkId` anywhere in the item tree
    pub fn find_item(&self, link_id: &str) -> Option<&QuestionnaireItem> {
        find_item_in(self.items(), link_id)
    }

    /// Top-level items, empty when there are none
    pub fn items(&self) -> &[QuestionnaireItem] {
        self.item.as_deref().unwrap_or_default()
    }

    /// Every `linkId` in the item tree, depth first
    pub fn link_ids(&self) -> Vec<&str> {
        let mut link_ids = Vec::new();
        collect_link_ids(self.items(), &mut link_ids);
        link_ids
    }
}

impl QuestionnaireItem {
    pub fn new(link_id: impl Into<String>, type_: QuestionnaireItemType) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            link_id: link_id.into(),
            definition: None,
            code: None,
            prefix: None,
            text: None,
            type_,
            enable_when: None,
            enable_behavior: None,
            disabled_display: None,
            required: None,
            repeats: None,
            read_only: None,
            max_length: None,
            answer_constraint: None,
            answer_value_set: None,
            answer_option: None,
            initial: None,
            item: None,
            additional: HashMap::new(),
        }
    }

    /// Child items, empty when there are none
    pub fn items(&self) -> &[QuestionnaireItem] {
        self.item.as_deref().unwrap_or_default()
    }

    pub fn is_group(&self) -> bool {
        self.type_ == QuestionnaireItemType::Group
    }
}

impl QuestionnaireItemEnableWhen {
    pub fn new(question: impl Into<String>, operator: QuestionnaireItemOperator) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            question: question.into(),
            operator,
            answer_boolean: None,
            answer_decimal: None,
            answer_integer: None,
            answer_date: None,
            answer_date_time: None,
            answer_time: None,
            answer_string: None,
            answer_coding: None,
            answer_quantity: None,
            answer_reference: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Questionnaire);

impl Validate for Questionnaire {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "Questionnaire");
        ctx.uri("url", self.url.as_deref());
        ctx.each("identifier", &self.identifier);
        ctx.choice(
            "versionAlgorithm[x]",
            &[
                ("versionAlgorithmString", self.version_algorithm_string.is_some()),
                ("versionAlgorithmCoding", self.version_algorithm_coding.is_some()),
            ],
        );
        ctx.optional("versionAlgorithmCoding", &self.version_algorithm_coding);
        ctx.uris("derivedFrom", &self.derived_from);
        ctx.codes("subjectType", &self.subject_type);
        ctx.date_time("date", self.date.as_deref());
        ctx.each("contact", &self.contact);
        ctx.each("useContext", &self.use_context);
        ctx.each("jurisdiction", &self.jurisdiction);
        ctx.date("approvalDate", self.approval_date.as_deref());
        ctx.date("lastReviewDate", self.last_review_date.as_deref());
        ctx.optional("effectivePeriod", &self.effective_period);
        ctx.each("code", &self.code);
        ctx.each("item", &self.item);

        let mut seen = HashSet::new();
        let distinct = self.link_ids().into_iter().all(|link_id| seen.insert(link_id));
        ctx.invariant(
            "que-2",
            distinct,
            "The link ids for groups and questions must be unique within the Questionnaire",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for QuestionnaireItem {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("linkId", &self.link_id);
        ctx.uri("definition", self.definition.as_deref());
        ctx.each("code", &self.code);
        ctx.each("enableWhen", &self.enable_when);
        ctx.uri("answerValueSet", self.answer_value_set.as_deref());
        ctx.each("answerOption", &self.answer_option);
        ctx.each("initial", &self.initial);
        ctx.each("item", &self.item);

        let is_display = self.type_ == QuestionnaireItemType::Display;
        let has_items = !self.items().is_empty();
        ctx.invariant(
            "que-1a",
            self.type_ != QuestionnaireItemType::Group || has_items,
            "Group items must have nested items",
        );
        ctx.invariant(
            "que-1c",
            !is_display || !has_items,
            "Display items cannot have child items",
        );
        ctx.invariant(
            "que-4",
            self.answer_option.is_none() || self.answer_value_set.is_none(),
            "A question cannot have both answerOption and answerValueSet",
        );
        ctx.invariant(
            "que-6",
            !is_display || (self.required.is_none() && self.repeats.is_none()),
            "Required and repeat aren't permitted for display items",
        );
        ctx.invariant(
            "que-9",
            !is_display || self.read_only.is_none(),
            "Read-only can't be specified for \"display\" items",
        );
        ctx.invariant(
            "que-10",
            self.max_length.is_none()
                || matches!(
                    self.type_,
                    QuestionnaireItemType::Boolean
                        | QuestionnaireItemType::Decimal
                        | QuestionnaireItemType::Integer
                        | QuestionnaireItemType::String
                        | QuestionnaireItemType::Text
                        | QuestionnaireItemType::Url
                ),
            "Maximum length can only be declared for simple question types",
        );
        ctx.invariant(
            "que-11",
            self.answer_option.is_none() || self.initial.is_none(),
            "If one or more answerOption is present, initial cannot be present",
        );
        ctx.invariant(
            "que-12",
            self.enable_when.as_ref().map_or(0, Vec::len) <= 1 || self.enable_behavior.is_some(),
            "If there are more than one enableWhen, enableBehavior must be specified",
        );
        ctx.invariant(
            "que-13",
            self.repeats == Some(true) || self.initial.as_ref().map_or(0, Vec::len) <= 1,
            "Can only have multiple initial values for repeating items",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for QuestionnaireItemEnableWhen {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("question", &self.question);
        ctx.required_choice(
            "answer[x]",
            &[
                ("answerBoolean", self.answer_boolean.is_some()),
                ("answerDecimal", self.answer_decimal.is_some()),
                ("answerInteger", self.answer_integer.is_some()),
                ("answerDate", self.answer_date.is_some()),
                ("answerDateTime", self.answer_date_time.is_some()),
                ("answerTime", self.answer_time.is_some()),
                ("answerString", self.answer_string.is_some()),
                ("answerCoding", self.answer_coding.is_some()),
                ("answerQuantity", self.answer_quantity.is_some()),
                ("answerReference", self.answer_reference.is_some()),
            ],
        );
        ctx.date("answerDate", self.answer_date.as_deref());
        ctx.date_time("answerDateTime", self.answer_date_time.as_deref());
        ctx.time("answerTime", self.answer_time.as_deref());
        ctx.optional("answerCoding", &self.answer_coding);
        ctx.optional("answerQuantity", &self.answer_quantity);
        ctx.optional("answerReference", &self.answer_reference);

        ctx.invariant(
            "que-7",
            self.operator != QuestionnaireItemOperator::Exists || self.answer_boolean.is_some(),
            "If the operator is 'exists', the value must be a boolean",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for QuestionnaireItemAnswerOption {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_choice(
            "value[x]",
            &[
                ("valueInteger", self.value_integer.is_some()),
                ("valueDate", self.value_date.is_some()),
                ("valueTime", self.value_time.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valueCoding", self.value_coding.is_some()),
                ("valueReference", self.value_reference.is_some()),
            ],
        );
        ctx.date("valueDate", self.value_date.as_deref());
        ctx.time("valueTime", self.value_time.as_deref());
        ctx.optional("valueCoding", &self.value_coding);
        ctx.optional("valueReference", &self.value_reference);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for QuestionnaireItemInitial {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_choice(
            "value[x]",
            &[
                ("valueBoolean", self.value_boolean.is_some()),
                ("valueDecimal", self.value_decimal.is_some()),
                ("valueInteger", self.value_integer.is_some()),
                ("valueDate", self.value_date.is_some()),
                ("valueDateTime", self.value_date_time.is_some()),
                ("valueTime", self.value_time.is_some()),
                ("valueString", self.value_string.is_some()),
                ("valueUri", self.value_uri.is_some()),
                ("valueAttachment", self.value_attachment.is_some()),
                ("valueCoding", self.value_coding.is_some()),
                ("valueQuantity", self.value_quantity.is_some()),
                ("valueReference", self.value_reference.is_some()),
            ],
        );
        ctx.date("valueDate", self.value_date.as_deref());
        ctx.date_time("valueDateTime", self.value_date_time.as_deref());
        ctx.time("valueTime", self.value_time.as_deref());
        ctx.uri("valueUri", self.value_uri.as_deref());
        ctx.optional("valueAttachment", &self.value_attachment);
        ctx.optional("valueCoding", &self.value_coding);
        ctx.optional("valueQuantity", &self.value_quantity);
        ctx.optional("valueReference", &self.value_reference);
        ctx.unknown_elements(&self.additional);
    }
}

fn find_item_in<'a>(
    items: &'a [QuestionnaireItem],
    link_id: &str,
) -> Option<&'a QuestionnaireItem> {
    items.iter().find_map(|item| {
        if item.link_id == link_id {
            Some(item)
        } else {
            find_item_in(item.items(), link_id)
        }
    })
}

fn collect_link_ids<'a>(items: &'a [QuestionnaireItem], link_ids: &mut Vec<&'a str>) {
    for item in items {
        link_ids.push(item.link_id.as_str());
        collect_link_ids(item.items(), link_ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    fn phq2() -> Questionnaire {
        Questionnaire::from_value(json!({
            "resourceType": "Questionnaire",
            "id": "phq-2",
            "url": "http://example.org/Questionnaire/phq-2",
            "status": "active",
            "subjectType": ["Patient"],
            "item": [
                {"linkId": "intro", "type": "display", "text": "Over the last 2 weeks, how often have you been bothered by:"},
                {
                    "linkId": "screen",
                    "type": "group",
                    "item": [
                        {
                            "linkId": "interest",
                            "type": "coding",
                            "text": "Little interest or pleasure in doing things",
                            "required": true,
                            "answerValueSet": "http://example.org/ValueSet/frequency"
                        },
                        {
                            "linkId": "mood",
                            "type": "coding",
                            "text": "Feeling down, depressed, or hopeless",
                            "enableWhen": [{"question": "interest", "operator": "exists", "answerBoolean": true}],
                            "answerOption": [
                                {"valueCoding": {"system": "http://loinc.org", "code": "LA6568-5", "display": "Not at all"}},
                                {"valueCoding": {"system": "http://loinc.org", "code": "LA6569-3", "display": "Several days"}}
                            ]
                        }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn has_invariant(outcome: &crate::validation::ValidationOutcome, key: &str) -> bool {
        outcome
            .issues
            .iter()
            .any(|issue| issue.code == IssueType::Invariant && issue.diagnostics.contains(key))
    }

    #[test]
    fn test_parse_nested_items() {
        let questionnaire = phq2();
        assert_eq!(questionnaire.items().len(), 2);
        assert!(questionnaire.items()[1].is_group());

        let mood = questionnaire.find_item("mood").unwrap();
        assert_eq!(mood.type_, QuestionnaireItemType::Coding);
        assert_eq!(mood.answer_option.as_ref().unwrap().len(), 2);
        assert!(questionnaire.find_item("missing").is_none());

        assert_eq!(questionnaire.link_ids(), vec!["intro", "screen", "interest", "mood"]);
        let outcome = questionnaire.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_item_type_serializes_as_code() {
        let item = QuestionnaireItem::new("q1", QuestionnaireItemType::DateTime);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, json!({"linkId": "q1", "type": "dateTime"}));
    }

    #[test]
    fn test_duplicate_link_ids() {
        let mut questionnaire = phq2();
        questionnaire.item.as_mut().unwrap()[0].link_id = "mood".to_string();
        let outcome = questionnaire.validate();
        assert!(has_invariant(&outcome, "que-2"));
        assert_eq!(outcome.issues[0].location.as_deref(), Some("Questionnaire"));
    }

    #[test]
    fn test_group_needs_items_and_display_has_none() {
        let mut display = QuestionnaireItem::new("note", QuestionnaireItemType::Display);
        display.item = Some(vec![QuestionnaireItem::new("inner", QuestionnaireItemType::String)]);

        let mut questionnaire = Questionnaire::new(PublicationStatus::Draft);
        questionnaire.item = Some(vec![
            QuestionnaireItem::new("empty-group", QuestionnaireItemType::Group),
            display,
        ]);

        let outcome = questionnaire.validate();
        let group_issue = outcome.issues_at("Questionnaire.item[0]").next().unwrap();
        assert!(group_issue.diagnostics.contains("que-1a"));
        let display_issue = outcome.issues_at("Questionnaire.item[1]").next().unwrap();
        assert!(display_issue.diagnostics.contains("que-1c"));
    }

    #[test]
    fn test_answer_option_and_value_set_exclusive() {
        let mut questionnaire = phq2();
        let screen = &mut questionnaire.item.as_mut().unwrap()[1];
        screen.item.as_mut().unwrap()[1].answer_value_set =
            Some("http://example.org/ValueSet/frequency".to_string());

        let outcome = questionnaire.validate();
        assert!(has_invariant(&outcome, "que-4"));
        assert!(outcome.issues_at("Questionnaire.item[1].item[1]").next().is_some());
    }

    #[test]
    fn test_enable_when_answer_required() {
        let questionnaire = Questionnaire::from_value(json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [
                {"linkId": "smoker", "type": "boolean"},
                {
                    "linkId": "packs",
                    "type": "integer",
                    "enableWhen": [{"question": "smoker", "operator": "="}]
                }
            ]
        }))
        .unwrap();

        let outcome = questionnaire.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Questionnaire.item[1].enableWhen[0].answer[x]")
        );
    }

    #[test]
    fn test_exists_operator_needs_boolean() {
        let mut condition = QuestionnaireItemEnableWhen::new("smoker", QuestionnaireItemOperator::Exists);
        condition.answer_string = Some("yes".to_string());

        let mut packs = QuestionnaireItem::new("packs", QuestionnaireItemType::Integer);
        packs.enable_when = Some(vec![condition]);

        let mut questionnaire = Questionnaire::new(PublicationStatus::Draft);
        questionnaire.item = Some(vec![
            QuestionnaireItem::new("smoker", QuestionnaireItemType::Boolean),
            packs,
        ]);

        let outcome = questionnaire.validate();
        assert!(has_invariant(&outcome, "que-7"));
    }

    #[test]
    fn test_display_item_flags() {
        let mut display = QuestionnaireItem::new("banner", QuestionnaireItemType::Display);
        display.required = Some(true);
        display.read_only = Some(true);

        let mut questionnaire = Questionnaire::new(PublicationStatus::Active);
        questionnaire.item = Some(vec![display]);

        let outcome = questionnaire.validate();
        assert!(has_invariant(&outcome, "que-6"));
        assert!(has_invariant(&outcome, "que-9"));
    }

    #[test]
    fn test_unknown_item_type_rejected() {
        let result = Questionnaire::from_value(json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [{"linkId": "q", "type": "choice"}]
        }));
        assert!(result.is_err());
    }
}
