//! FHIR Bundle resource

use super::Resource;
use crate::r5::codes::{BundleType, HttpVerb, SearchEntryMode};
use crate::r5::datatypes::{Extension, Identifier, Meta, Signature};
use crate::validation::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A container for a collection of resources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
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

    /// Persistent identifier for the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    /// document | message | transaction | transaction-response | batch | batch-response | history | searchset | collection | subscription-notification
    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    /// When the bundle was assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// If search, the total number of matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    /// Links related to this Bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<BundleLink>>,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,

    /// Issues with the Bundle, as an OperationOutcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Resource>,

    /// Unrecognized elements, kept for round-tripping and reported by validation
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

/// A series of links that provide context to this bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// See http://www.iana.org/assignments/link-relations/link-relations.xhtml#link-relations-1
    pub relation: String,

    /// Reference details for the link
    pub url: String,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// An entry in a bundle resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Links related to this entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<BundleLink>>,

    /// URI for resource (e.g. the absolute URL server address, URI for UUID/OID, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,

    /// Search related information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<BundleEntrySearch>,

    /// Additional execution information (transaction/batch/history)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleEntryRequest>,

    /// Results of execution (transaction/batch/history)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<BundleEntryResponse>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntrySearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// match | include - why this is in the result set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchEntryMode>,

    /// Search ranking (between 0 and 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// GET | HEAD | POST | PUT | DELETE | PATCH
    pub method: HttpVerb,

    /// URL for HTTP equivalent of this entry
    pub url: String,

    /// For managing cache validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_none_match: Option<String>,

    /// For managing cache currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_modified_since: Option<String>,

    /// For managing update contention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_match: Option<String>,

    /// For conditional creates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_none_exist: Option<String>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_extension: Option<Vec<Extension>>,

    /// Status response code (text optional)
    pub status: String,

    /// The location (if the operation returns a location)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// The Etag for the resource (if relevant)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Server's date time modified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,

    /// OperationOutcome with hints and warnings (for batch/transaction)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Resource>,
    /// Unrecognized elements and primitive extensions (`_name`), kept for round-tripping
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Bundle {
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            implicit_rules: None,
            language: None,
            identifier: None,
            bundle_type,
            timestamp: None,
            total: None,
            link: None,
            entry: None,
            signature: None,
            issues: None,
            additional: HashMap::new(),
        }
    }

    /// Check if this is a transaction bundle
    pub fn is_transaction(&self) -> bool {
        matches!(self.bundle_type, BundleType::Transaction)
    }

    /// Check if this is a batch bundle
    pub fn is_batch(&self) -> bool {
        matches!(self.bundle_type, BundleType::Batch)
    }

    /// Check if this is a search result bundle
    pub fn is_searchset(&self) -> bool {
        matches!(self.bundle_type, BundleType::Searchset)
    }

    pub fn entry_count(&self) -> usize {
        self.entry.as_ref().map_or(0, Vec::len)
    }

    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or_default()
    }

    pub fn entries_mut(&mut self) -> &mut [BundleEntry] {
        self.entry.as_deref_mut().unwrap_or_default()
    }

    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entry.get_or_insert_with(Vec::new).push(entry);
    }

    pub fn add_link(&mut self, relation: impl Into<String>, url: impl Into<String>) {
        self.link
            .get_or_insert_with(Vec::new)
            .push(BundleLink::new(relation, url));
    }

    /// Resources carried by the entries, in entry order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entries().iter().filter_map(|entry| entry.resource.as_ref())
    }

    /// Number of entry resources per resource type
    pub fn resource_type_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for resource in self.resources() {
            *counts.entry(resource.resource_type()).or_insert(0) += 1;
        }
        counts
    }
}

impl BundleLink {
    pub fn new(relation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            relation: relation.into(),
            url: url.into(),
            additional: HashMap::new(),
        }
    }
}

impl BundleEntry {
    /// An entry carrying `resource`
    pub fn for_resource(resource: impl Into<Resource>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..Default::default()
        }
    }

    pub fn with_full_url(mut self, full_url: impl Into<String>) -> Self {
        self.full_url = Some(full_url.into());
        self
    }
}

impl BundleEntryRequest {
    pub fn new(method: HttpVerb, url: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            method,
            url: url.into(),
            if_none_match: None,
            if_modified_since: None,
            if_match: None,
            if_none_exist: None,
            additional: HashMap::new(),
        }
    }
}

impl BundleEntryResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            id: None,
            extension: None,
            modifier_extension: None,
            status: status.into(),
            location: None,
            etag: None,
            last_modified: None,
            outcome: None,
            additional: HashMap::new(),
        }
    }
}

impl_fhir_resource!(Bundle);

impl Validate for Bundle {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_resource_header!(ctx, self, "Bundle");
        ctx.optional("identifier", &self.identifier);
        ctx.instant("timestamp", self.timestamp.as_deref());
        ctx.each("link", &self.link);
        ctx.each("entry", &self.entry);
        ctx.optional("signature", &self.signature);
        ctx.optional("issues", &self.issues);

        let bundle_type = self.bundle_type;
        ctx.invariant(
            "bdl-1",
            self.total.is_none()
                || matches!(bundle_type, BundleType::Searchset | BundleType::History),
            "total only when a search or history",
        );

        let needs_request = matches!(
            bundle_type,
            BundleType::Batch | BundleType::Transaction | BundleType::History
        );
        let needs_response = matches!(
            bundle_type,
            BundleType::BatchResponse | BundleType::TransactionResponse | BundleType::History
        );
        for (index, entry) in self.entries().iter().enumerate() {
            ctx.within(format!("entry[{index}]"), |ctx| {
                ctx.invariant(
                    "bdl-2",
                    entry.search.is_none() || bundle_type == BundleType::Searchset,
                    "entry.search only when a search",
                );
                ctx.invariant(
                    "bdl-3",
                    entry.request.is_some() == needs_request,
                    "entry.request mandatory for batch/transaction/history, otherwise prohibited",
                );
                ctx.invariant(
                    "bdl-4",
                    entry.response.is_some() == needs_response,
                    "entry.response mandatory for batch-response/transaction-response/history, otherwise prohibited",
                );
            });
        }

        ctx.invariant(
            "bdl-7",
            bundle_type == BundleType::History || full_urls_unique(self.entries()),
            "FullUrl must be unique in a bundle, or else entries with the same fullUrl must have different meta.versionId (except in history bundles)",
        );

        if bundle_type == BundleType::Document {
            let identified = self
                .identifier
                .as_ref()
                .is_some_and(|id| id.system.is_some() && id.value.is_some());
            ctx.invariant(
                "bdl-9",
                identified,
                "A document must have an identifier with a system and a value",
            );
            ctx.invariant("bdl-10", self.timestamp.is_some(), "A document must have a date");
        }

        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for BundleLink {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("relation", &self.relation);
        ctx.code("relation", Some(self.relation.as_str()));
        ctx.required_str("url", &self.url);
        ctx.uri("url", Some(self.url.as_str()));
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for BundleEntry {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.each("link", &self.link);
        ctx.uri("fullUrl", self.full_url.as_deref());
        ctx.optional("resource", &self.resource);
        ctx.optional("search", &self.search);
        ctx.optional("request", &self.request);
        ctx.optional("response", &self.response);

        ctx.invariant(
            "bdl-5",
            self.resource.is_some() || self.request.is_some() || self.response.is_some(),
            "must be a resource unless there's a request or response",
        );
        ctx.invariant(
            "bdl-8",
            self.full_url.as_deref().map_or(true, |url| !url.contains("/_history/")),
            "fullUrl cannot be a version specific reference",
        );
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for BundleEntrySearch {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for BundleEntryRequest {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("url", &self.url);
        ctx.uri("url", Some(self.url.as_str()));
        ctx.instant("ifModifiedSince", self.if_modified_since.as_deref());
        ctx.unknown_elements(&self.additional);
    }
}

impl Validate for BundleEntryResponse {
    fn validate_into(&self, ctx: &mut ValidationContext<'_>) {
        validate_backbone!(ctx, self);
        ctx.required_str("status", &self.status);
        ctx.uri("location", self.location.as_deref());
        ctx.instant("lastModified", self.last_modified.as_deref());
        ctx.optional("outcome", &self.outcome);
        ctx.unknown_elements(&self.additional);
    }
}

/// `fullUrl` plus `meta.versionId` must not repeat across entries
fn full_urls_unique(entries: &[BundleEntry]) -> bool {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| {
            let full_url = entry.full_url.as_deref()?;
            let version = entry
                .resource
                .as_ref()
                .and_then(Resource::meta)
                .and_then(|meta| meta.version_id.as_deref());
            Some((full_url, version))
        })
        .all(|key| seen.insert(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::codes::IssueType;
    use crate::r5::resources::{FhirResource, Patient};
    use crate::validation::ValidationOutcome;
    use serde_json::json;

    fn invariant_at<'a>(outcome: &'a ValidationOutcome, location: &'a str, key: &str) -> bool {
        outcome
            .issues_at(location)
            .any(|issue| issue.code == IssueType::Invariant && issue.diagnostics.contains(key))
    }

    #[test]
    fn test_deserialize_bundle() {
        let bundle = Bundle::from_value(json!({
            "resourceType": "Bundle",
            "id": "example-bundle",
            "type": "searchset",
            "total": 1,
            "link": [{"relation": "self", "url": "http://example.org/fhir/Patient?_id=123"}],
            "entry": [
                {
                    "fullUrl": "http://example.org/fhir/Patient/123",
                    "resource": {
                        "resourceType": "Patient",
                        "id": "123"
                    },
                    "search": {
                        "mode": "match",
                        "score": 1.0
                    }
                }
            ]
        }))
        .unwrap();

        assert_eq!(bundle.id.as_deref(), Some("example-bundle"));
        assert_eq!(bundle.bundle_type, BundleType::Searchset);
        assert_eq!(bundle.total, Some(1));
        assert_eq!(bundle.entry_count(), 1);

        let patient = bundle.entries()[0].resource.as_ref().unwrap().as_patient().unwrap();
        assert_eq!(patient.id.as_deref(), Some("123"));
        assert_eq!(bundle.entries()[0].search.as_ref().unwrap().mode, Some(SearchEntryMode::Match));

        let outcome = bundle.validate();
        assert!(outcome.valid, "{:?}", outcome.issues);
    }

    #[test]
    fn test_serialize_bundle() {
        let bundle = Bundle::new(BundleType::Transaction);
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["resourceType"], "Bundle");
        assert_eq!(json["type"], "transaction");
    }

    #[test]
    fn test_is_transaction() {
        let bundle = Bundle::new(BundleType::Transaction);
        assert!(bundle.is_transaction());
        assert!(!bundle.is_batch());
    }

    #[test]
    fn test_is_batch() {
        let bundle = Bundle::new(BundleType::Batch);
        assert!(bundle.is_batch());
        assert!(!bundle.is_transaction());
    }

    #[test]
    fn test_is_searchset() {
        let bundle = Bundle::new(BundleType::Searchset);
        assert!(bundle.is_searchset());
    }

    #[test]
    fn test_add_entry() {
        let mut bundle = Bundle::new(BundleType::Collection);
        let mut patient = Patient::new();
        patient.id = Some("123".to_string());
        bundle.add_entry(
            BundleEntry::for_resource(patient).with_full_url("http://example.org/fhir/Patient/123"),
        );

        assert_eq!(bundle.entry_count(), 1);
        assert_eq!(bundle.entries()[0].resource.as_ref().unwrap().id(), Some("123"));
        assert!(bundle.validate().valid);
    }

    #[test]
    fn test_add_link() {
        let mut bundle = Bundle::new(BundleType::Searchset);
        bundle.add_link("self", "http://example.org/fhir/Patient?_id=123");
        assert_eq!(bundle.link.as_ref().unwrap().len(), 1);
        assert_eq!(bundle.link.as_ref().unwrap()[0].relation, "self");
    }

    #[test]
    fn test_bundle_entry_request() {
        let request = BundleEntryRequest::new(HttpVerb::Post, "Patient");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["url"], "Patient");
    }

    #[test]
    fn test_bundle_entry_response() {
        let mut response = BundleEntryResponse::new("201 Created");
        response.location = Some("Patient/123/_history/1".to_string());
        response.etag = Some("W/\"1\"".to_string());
        response.last_modified = Some("2023-01-01T00:00:00Z".to_string());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "201 Created");
        assert_eq!(json["location"], "Patient/123/_history/1");
        assert_eq!(json["lastModified"], "2023-01-01T00:00:00Z");
    }

    #[test]
    fn test_resource_type_counts() {
        let bundle = Bundle::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient"}},
                {"resource": {"resourceType": "Observation", "status": "final", "code": {"text": "Weight"}}},
                {"resource": {"resourceType": "Observation", "status": "final", "code": {"text": "Height"}}}
            ]
        }))
        .unwrap();

        let counts = bundle.resource_type_counts();
        assert_eq!(counts.get("Observation"), Some(&2));
        assert_eq!(counts.get("Patient"), Some(&1));
        assert_eq!(bundle.resources().count(), 3);
    }

    #[test]
    fn test_unsupported_entry_resource() {
        let result = Bundle::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [{"resource": {"resourceType": "Basic"}}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_entry_resource_validated_in_place() {
        let bundle = Bundle::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient", "birthDate": "1974-13-01"}}
            ]
        }))
        .unwrap();

        let outcome = bundle.validate();
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(
            outcome.issues[0].location.as_deref(),
            Some("Bundle.entry[0].resource.birthDate")
        );
    }

    #[test]
    fn test_total_only_for_search_or_history() {
        let mut bundle = Bundle::new(BundleType::Collection);
        bundle.total = Some(3);
        let outcome = bundle.validate();
        assert!(invariant_at(&outcome, "Bundle", "bdl-1"));

        bundle.bundle_type = BundleType::History;
        assert!(bundle.validate().valid);
    }

    #[test]
    fn test_search_only_in_searchset() {
        let mut entry = BundleEntry::for_resource(Patient::new());
        entry.search = Some(BundleEntrySearch {
            mode: Some(SearchEntryMode::Include),
            ..Default::default()
        });

        let mut bundle = Bundle::new(BundleType::Collection);
        bundle.add_entry(entry);
        assert!(invariant_at(&bundle.validate(), "Bundle.entry[0]", "bdl-2"));
    }

    #[test]
    fn test_transaction_entries_need_request() {
        let mut bundle = Bundle::new(BundleType::Transaction);
        bundle.add_entry(BundleEntry::for_resource(Patient::new()));

        let mut with_request = BundleEntry::for_resource(Patient::new());
        with_request.request = Some(BundleEntryRequest::new(HttpVerb::Post, "Patient"));
        bundle.add_entry(with_request);

        let outcome = bundle.validate();
        assert!(invariant_at(&outcome, "Bundle.entry[0]", "bdl-3"));
        assert!(!invariant_at(&outcome, "Bundle.entry[1]", "bdl-3"));
    }

    #[test]
    fn test_response_bundle_entries_need_response() {
        let mut bundle = Bundle::new(BundleType::TransactionResponse);
        bundle.add_entry(BundleEntry {
            response: Some(BundleEntryResponse::new("200 OK")),
            ..Default::default()
        });
        bundle.add_entry(BundleEntry::for_resource(Patient::new()));

        let outcome = bundle.validate();
        assert!(!invariant_at(&outcome, "Bundle.entry[0]", "bdl-4"));
        assert!(invariant_at(&outcome, "Bundle.entry[1]", "bdl-4"));
    }

    #[test]
    fn test_entry_needs_content() {
        let mut bundle = Bundle::new(BundleType::Collection);
        bundle.add_entry(
            BundleEntry::default().with_full_url("urn:uuid:61ebe359-bfdc-4613-8bf2-c5e300945f0a"),
        );
        assert!(invariant_at(&bundle.validate(), "Bundle.entry[0]", "bdl-5"));
    }

    #[test]
    fn test_full_url_rules() {
        let mut bundle = Bundle::new(BundleType::Collection);
        bundle.add_entry(
            BundleEntry::for_resource(Patient::new()).with_full_url("http://example.org/fhir/Patient/1"),
        );
        bundle.add_entry(
            BundleEntry::for_resource(Patient::new()).with_full_url("http://example.org/fhir/Patient/1"),
        );
        bundle.add_entry(
            BundleEntry::for_resource(Patient::new())
                .with_full_url("http://example.org/fhir/Patient/2/_history/4"),
        );

        let outcome = bundle.validate();
        assert!(invariant_at(&outcome, "Bundle", "bdl-7"));
        assert!(invariant_at(&outcome, "Bundle.entry[2]", "bdl-8"));
    }

    #[test]
    fn test_document_needs_identifier_and_timestamp() {
        let mut bundle = Bundle::new(BundleType::Document);
        bundle.add_entry(BundleEntry::for_resource(Patient::new()));

        let outcome = bundle.validate();
        assert!(invariant_at(&outcome, "Bundle", "bdl-9"));
        assert!(invariant_at(&outcome, "Bundle", "bdl-10"));

        bundle.identifier = Some(Identifier::new(
            "urn:ietf:rfc:3986",
            "urn:uuid:0c3151bd-1cbf-4d64-b04d-cd9187a4c6e0",
        ));
        bundle.timestamp = Some("2024-03-01T10:00:00Z".to_string());
        assert!(bundle.validate().valid);
    }
}
