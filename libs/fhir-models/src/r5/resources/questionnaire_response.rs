//! FHIR QuestionnaireResponse resource

use super::Resource;
use crate::r5::codes::QuestionnaireResponseStatus;
use crate::r5::datatypes::{
    Attachment, Coding, Extension, Identifier, Meta, Narrative, Quantity, Reference,
};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A structured set of questions and their answers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    /// Resource type - always "QuestionnaireResponse"
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

    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Vec<Reference>>,

    /// Canonical URL of the Questionnaire being answered
    pub questionnaire: String,

    /// in-progress | completed | amended | entered-in-error | stopped
    pub status: QuestionnaireResponseStatus,

    /// The subject of the questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Date the answers were gathered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Reference>,

    /// The individual or device that received and recorded the answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Reference>,

    /// Groups and questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<QuestionnaireResponseItem>>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "QuestionnaireResponse".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponseItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Pointer to specific item from Questionnaire
    pub link_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The response(s) to the question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Vec<QuestionnaireResponseItemAnswer>>,

    /// Child items of group item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<QuestionnaireResponseItem>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponseItemAnswer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Single-valued answer to the question
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

    /// Child items of question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<QuestionnaireResponseItem>>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl QuestionnaireResponse {
    pub fn new(questionnaire: impl Into<String>, status: QuestionnaireResponseStatus) -> Self {
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
            based_on: None,
            part_of: None,
            questionnaire: questionnaire.into(),
            status,
            subject: None,
            encounter: None,
            authored: None,
            author: None,
            source: None,
            item: None,
            additional: HashMap::new(),
        }
    }

    /// Top-level items, empty when there are none
    pub fn items(&self) -> &[QuestionnaireResponseItem] {
        self.item.as_deref().unwrap_or_default()
    }

    /// Find an item by `linkId`, searching nested items and items beneath answers
    pub fn find_item(&self, link_id: &str) -> Option<&QuestionnaireResponseItem> {
        find_item_in(self.items(), link_id)
    }

    pub fn is_complete(&self) -> bool {
        matches!(
            self.status,
            QuestionnaireResponseStatus::Completed | QuestionnaireResponseStatus::Amended
        )
    }
}

impl QuestionnaireResponseItem {
    pub fn new(link_id: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            link_id: link_id.into(),
            definition: None,
            text: None,
            answer: None,
            item: None,
            additional: HashMap::new(),
        }
    }

    /// Child items, empty when there are none
    pub fn items(&self) -> &[QuestionnaireResponseItem] {
        self.item.as_deref().unwrap_or_default()
    }

    pub fn answers(&self) -> &[QuestionnaireResponseItemAnswer] {
        self.answer.as_deref().unwrap_or_default()
    }
}

impl QuestionnaireResponseItemAnswer {
    /// Items nested beneath this answer
    pub fn items(&self) -> &[QuestionnaireResponseItem] {
        self.item.as_deref().unwrap_or_default()
    }
}

impl_fhir_resource!(QuestionnaireResponse);

impl Validate for QuestionnaireResponse {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_domain_resource_header!(ctx, self, "QuestionnaireResponse");
        ctx.each("identifier", &self.identifier);
        ctx.each("basedOn", &self.based_on);
        ctx.each("partOf", &self.part_of);
        ctx.required_str("questionnaire", &self.questionnaire);
        ctx.uri("questionnaire", Some(self.questionnaire.as_str()));
        ctx.optional("subject", &self.subject);
        ctx.optional("encounter", &self.encounter);
        ctx.date_time("authored", self.authored.as_deref());
        ctx.optional("author", &self.author);
        ctx.optional("source", &self.source);
        ctx.each("item", &self.item);

        ctx.invariant(
            "qrs-2",
            distinct_link_ids(self.items()),
            "Repeated answers are combined in the answers array of a single item",
        );

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for QuestionnaireResponseItem {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("linkId", &self.link_id);
        ctx.uri("definition", self.definition.as_deref());
        ctx.each("answer", &self.answer);
        ctx.each("item", &self.item);

        ctx.invariant(
            "qrs-1",
            self.answer.is_none() || self.item.is_none(),
            "Nested item can't be beneath both item and answer",
        );
        ctx.invariant(
            "qrs-2",
            distinct_link_ids(self.items()),
            "Repeated answers are combined in the answers array of a single item",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for QuestionnaireResponseItemAnswer {
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
        ctx.each("item", &self.item);

        ctx.invariant(
            "qrs-2",
            distinct_link_ids(self.items()),
            "Repeated answers are combined in the answers array of a single item",
        );
        ctx.unknown_elements(&self.additional);
    }
}

fn find_item_in<'a>(
    items: &'a [QuestionnaireResponseItem],
    link_id: &str,
) -> Option<&'a QuestionnaireResponseItem> {
    items.iter().find_map(|item| {
        if item.link_id == link_id {
            return Some(item);
        }
        find_item_in(item.items(), link_id).or_else(|| {
            item.answers()
                .iter()
                .find_map(|answer| find_item_in(answer.items(), link_id))
        })
    })
}

fn distinct_link_ids(items: &[QuestionnaireResponseItem]) -> bool {
    let mut seen = HashSet::new();
    items.iter().all(|item| seen.insert(item.link_id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::FhirResource;
    use serde_json::json;

    fn response() -> QuestionnaireResponse {
        QuestionnaireResponse::from_value(json!({
            "resourceType": "QuestionnaireResponse",
            "id": "f201",
            "questionnaire": "http://example.org/Questionnaire/smoking",
            "status": "completed",
            "subject": {"reference": "Patient/f201"},
            "authored": "2013-06-18T00:00:00+01:00",
            "item": [
                {
                    "linkId": "history",
                    "text": "Smoking history",
                    "item": [
                        {
                            "linkId": "smoker",
                            "answer": [{
                                "valueBoolean": true,
                                "item": [{"linkId": "packs", "answer": [{"valueInteger": 20}]}]
                            }]
                        },
                        {"linkId": "since", "answer": [{"valueDate": "1996"}]}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_and_find_items() {
        let response = response();
        assert!(response.is_complete());

        let packs = response.find_item("packs").unwrap();
        assert_eq!(packs.answers()[0].value_integer, Some(20));
        assert_eq!(
            response.find_item("since").unwrap().answers()[0].value_date.as_deref(),
            Some("1996")
        );
        assert!(response.find_item("unknown").is_none());

        let outcome = response.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_questionnaire_is_required() {
        let result = QuestionnaireResponse::from_value(json!({
            "resourceType": "QuestionnaireResponse",
            "status": "in-progress"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_answer_needs_value() {
        let mut item = QuestionnaireResponseItem::new("smoker");
        item.answer = Some(vec![QuestionnaireResponseItemAnswer::default()]);

        let mut response = QuestionnaireResponse::new(
            "http://example.org/Questionnaire/smoking",
            QuestionnaireResponseStatus::InProgress,
        );
        response.item = Some(vec![item]);

        let outcome = response.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.issues[0].code, IssueType::Required);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("QuestionnaireResponse.item[0].answer[0].value[x]")
        );
    }

    #[test]
    fn test_item_beneath_answer_and_item() {
        let mut item = QuestionnaireResponseItem::new("smoker");
        item.answer = Some(vec![QuestionnaireResponseItemAnswer {
            value_boolean: Some(true),
            ..Default::default()
        }]);
        item.item = Some(vec![QuestionnaireResponseItem::new("packs")]);

        let mut response = response();
        response.item = Some(vec![item]);

        let outcome = response.validate();
        let issue = outcome.issues_at("QuestionnaireResponse.item[0]").next().unwrap();
        assert!(issue.diagnostics.contains("qrs-1"));
    }

    #[test]
    fn test_repeated_sibling_link_ids() {
        let mut response = response();
        response.item = Some(vec![
            QuestionnaireResponseItem::new("history"),
            QuestionnaireResponseItem::new("history"),
        ]);

        let outcome = response.validate();
        assert!(!outcome.valid);
        assert!(outcome.issues[0].diagnostics.contains("qrs-2"));
        assert_eq!(outcome.issues[0].location.as_deref(), Some("QuestionnaireResponse"));
    }
}
