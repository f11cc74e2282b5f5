//! Scripted FHIR backend and MHD resource builders shared by the stored
//! query tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use xdsfhir_mapping::{MhdMapper, RepositorySettings};
use xdsfhir_query::{QuerySettings, StoredQueryProcessor};
use xdsfhir_storage::{Bundle, FhirBackend, SearchParams, StorageError};

type Matcher = Box<dyn Fn(&SearchParams) -> bool + Send + Sync>;

/// Answers searches with canned pages and records every search it sees.
/// A search no route matches gets an empty page.
#[derive(Default)]
pub struct ScriptedBackend {
    routes: Vec<(Matcher, Bundle)>,
    pages: Vec<(String, Bundle)>,
    searches: Mutex<Vec<SearchParams>>,
    page_loads: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// First matching route wins.
    pub fn on(
        mut self,
        matcher: impl Fn(&SearchParams) -> bool + Send + Sync + 'static,
        page: Bundle,
    ) -> Self {
        self.routes.push((Box::new(matcher), page));
        self
    }

    pub fn page(mut self, link: &str, page: Bundle) -> Self {
        self.pages.push((link.to_string(), page));
        self
    }

    pub fn searches(&self) -> Vec<SearchParams> {
        self.searches.lock().unwrap().clone()
    }

    pub fn page_loads(&self) -> Vec<String> {
        self.page_loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl FhirBackend for ScriptedBackend {
    async fn search(&self, params: &SearchParams) -> Result<Bundle, StorageError> {
        self.searches.lock().unwrap().push(params.clone());
        Ok(self
            .routes
            .iter()
            .find(|(matcher, _)| matcher(params))
            .map(|(_, page)| page.clone())
            .unwrap_or_default())
    }

    async fn load_page(&self, next_link: &str) -> Result<Bundle, StorageError> {
        self.page_loads.lock().unwrap().push(next_link.to_string());
        self.pages
            .iter()
            .find(|(link, _)| link == next_link)
            .map(|(_, page)| page.clone())
            .ok_or_else(|| StorageError::http(404, next_link))
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

/// Backend that fails every call.
pub struct FailingBackend;

#[async_trait]
impl FhirBackend for FailingBackend {
    async fn search(&self, _params: &SearchParams) -> Result<Bundle, StorageError> {
        Err(StorageError::http(503, "unavailable"))
    }

    async fn load_page(&self, next_link: &str) -> Result<Bundle, StorageError> {
        Err(StorageError::http(503, next_link))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

pub fn processor(backend: Arc<ScriptedBackend>, max_results: usize) -> StoredQueryProcessor {
    let mapper = MhdMapper::new(RepositorySettings::default()).unwrap();
    StoredQueryProcessor::new(backend, Arc::new(mapper), QuerySettings { max_results })
}

pub fn is_documents(params: &SearchParams) -> bool {
    params.resource_type == "DocumentReference"
}

pub fn is_folders(params: &SearchParams) -> bool {
    params.values("code").iter().any(|code| code.ends_with("|folder"))
}

pub fn is_submission_sets(params: &SearchParams) -> bool {
    params
        .values("code")
        .iter()
        .any(|code| code.ends_with("|submissionset"))
}

fn subject() -> Value {
    json!({"identifier": {"system": "urn:oid:1.3", "value": "id3"}})
}

/// A DocumentReference the MHD mapper accepts.
pub fn document(id: &str) -> Value {
    json!({
        "resourceType": "DocumentReference",
        "id": id,
        "identifier": [{"use": "official", "system": "urn:ietf:rfc:3986", "value": format!("urn:uuid:{id}")}],
        "status": "current",
        "subject": subject(),
        "content": [{"attachment": {"contentType": "text/plain"}}]
    })
}

pub fn document_relating(id: &str, relates_to: Value) -> Value {
    let mut doc = document(id);
    doc["relatesTo"] = relates_to;
    doc
}

pub fn document_by(id: &str, family: &str, given: &str) -> Value {
    let mut doc = document(id);
    doc["contained"] = json!([{
        "resourceType": "Practitioner",
        "id": "author",
        "name": [{"family": family, "given": [given]}]
    }]);
    doc["author"] = json!([{"reference": "#author"}]);
    doc
}

/// A DocumentReference without a patient, which the mapper rejects.
pub fn orphan_document(id: &str) -> Value {
    let mut doc = document(id);
    doc.as_object_mut().unwrap().remove("subject");
    doc
}

fn list(id: &str, list_type: &str, entries: Value) -> Value {
    json!({
        "resourceType": "List",
        "id": id,
        "identifier": [{"use": "official", "system": "urn:ietf:rfc:3986", "value": format!("urn:uuid:{id}")}],
        "status": "current",
        "mode": "working",
        "code": {"coding": [{"system": "https://profiles.ihe.net/ITI/MHD/CodeSystem/MHDlistTypes", "code": list_type}]},
        "subject": subject(),
        "date": "2021-03-04T05:06:07Z",
        "entry": entries
    })
}

pub fn folder(id: &str, entries: Value) -> Value {
    list(id, "folder", entries)
}

pub fn submission_set(id: &str, entries: Value) -> Value {
    list(id, "submissionset", entries)
}

pub fn page(resources: Vec<Value>) -> Bundle {
    Bundle::from_resources(resources)
}
