//! Search result pages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::reference::parse_reference;
use crate::resources::{FhirResource, Reference, ResolvedResource};

/// One page of a search result (a `searchset` Bundle).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

impl Bundle {
    /// A page holding the given raw resources.
    pub fn from_resources(resources: impl IntoIterator<Item = Value>) -> Self {
        Self {
            total: None,
            link: Vec::new(),
            entry: resources
                .into_iter()
                .map(|resource| BundleEntry {
                    full_url: None,
                    resource: Some(resource),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn with_next_link(mut self, url: impl Into<String>) -> Self {
        self.link.retain(|link| link.relation != "next");
        self.link.push(BundleLink {
            relation: "next".to_string(),
            url: url.into(),
        });
        self
    }

    /// URL of the following page, if the result set continues.
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation == "next")
            .map(|link| link.url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    /// Decodes every resource of kind `T` on this page, included ones too.
    ///
    /// References of the decoded resources are resolved against their
    /// contained resources and against the other resources of this page.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidBundle` when a resource of kind `T`
    /// does not decode.
    pub fn resources_of<T: FhirResource>(&self) -> Result<Vec<T>, StorageError> {
        let index = PageIndex::new(&self.entry);
        let resolver = ReferenceResolver::for_page(&index);

        self.entry
            .iter()
            .filter_map(|entry| entry.resource.as_ref())
            .filter(|raw| resource_type(raw) == Some(T::RESOURCE_TYPE))
            .map(|raw| {
                let mut resource: T = serde_json::from_value(raw.clone()).map_err(|e| {
                    StorageError::invalid_bundle(format!(
                        "{} could not be decoded: {e}",
                        T::RESOURCE_TYPE
                    ))
                })?;
                resource.resolve_references(&resolver);
                Ok(resource)
            })
            .collect()
    }
}

fn resource_type(raw: &Value) -> Option<&str> {
    raw.get("resourceType").and_then(Value::as_str)
}

/// Lookup tables over the resources of one page.
struct PageIndex<'a> {
    entries: &'a [BundleEntry],
    by_key: HashMap<String, usize>,
    by_full_url: HashMap<&'a str, usize>,
}

impl<'a> PageIndex<'a> {
    fn new(entries: &'a [BundleEntry]) -> Self {
        let mut by_key = HashMap::new();
        let mut by_full_url = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            if let Some(url) = entry.full_url.as_deref() {
                by_full_url.insert(url, position);
            }
            let Some(raw) = entry.resource.as_ref() else {
                continue;
            };
            if let (Some(kind), Some(id)) = (resource_type(raw), raw.get("id").and_then(Value::as_str))
            {
                by_key.entry(format!("{kind}/{id}")).or_insert(position);
            }
        }
        Self {
            entries,
            by_key,
            by_full_url,
        }
    }

    fn resource(&self, position: usize) -> Option<&'a Value> {
        self.entries.get(position).and_then(|entry| entry.resource.as_ref())
    }

    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        if let Some(&position) = self.by_full_url.get(reference) {
            return self.resource(position);
        }
        let key = parse_reference(reference).ok()?;
        self.by_key
            .get(&key.to_relative())
            .and_then(|&position| self.resource(position))
    }
}

/// Resolves references of one resource against its contained resources
/// and the resources of the page it was read from.
pub struct ReferenceResolver<'a> {
    page: Option<&'a PageIndex<'a>>,
    contained: &'a [Value],
}

impl<'a> ReferenceResolver<'a> {
    fn for_page(page: &'a PageIndex<'a>) -> Self {
        Self {
            page: Some(page),
            contained: &[],
        }
    }

    /// Same page, with `contained` as the local scope. An empty slice keeps
    /// the enclosing resource's contained resources in scope.
    pub fn scoped<'b>(&'b self, contained: &'b [Value]) -> ReferenceResolver<'b>
    where
        'a: 'b,
    {
        ReferenceResolver {
            page: self.page,
            contained: if contained.is_empty() {
                self.contained
            } else {
                contained
            },
        }
    }

    /// Raw resource a reference string points at.
    pub fn lookup(&self, reference: &str) -> Option<&'a Value> {
        if let Some(local) = reference.strip_prefix('#') {
            return self
                .contained
                .iter()
                .find(|raw| raw.get("id").and_then(Value::as_str) == Some(local));
        }
        self.page.and_then(|page| page.lookup(reference))
    }

    /// Fills `reference.resource` when the target is in scope.
    pub fn resolve(&self, reference: &mut Reference) {
        let Some(raw) = reference
            .reference
            .as_deref()
            .and_then(|target| self.lookup(target))
        else {
            return;
        };
        reference.resource = Some(Box::new(ResolvedResource::decode(raw, self)));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::resources::{DocumentReference, Identified, ListResource, MhdFolder};

    fn doc(id: &str, uuid: &str) -> Value {
        json!({
            "resourceType": "DocumentReference",
            "id": id,
            "identifier": [{"use": "official", "value": uuid}],
            "subject": {"reference": "Patient/p1"}
        })
    }

    fn patient() -> Value {
        json!({
            "resourceType": "Patient",
            "id": "p1",
            "identifier": [{"system": "urn:oid:1.2", "value": "id1"}]
        })
    }

    #[test]
    fn test_next_link() {
        let page = Bundle::default();
        assert!(page.next_link().is_none());

        let page = page.with_next_link("http://server/fhir?page=2");
        assert_eq!(page.next_link(), Some("http://server/fhir?page=2"));
    }

    #[test]
    fn test_resources_of_filters_by_kind() {
        let page = Bundle::from_resources([doc("d1", "urn:uuid:1"), patient(), doc("d2", "urn:uuid:2")]);

        let docs = page.resources_of::<DocumentReference>().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(page.resources_of::<ListResource>().unwrap().is_empty());
    }

    #[test]
    fn test_included_subject_is_resolved() {
        let page = Bundle::from_resources([doc("d1", "urn:uuid:1"), patient()]);
        let docs = page.resources_of::<DocumentReference>().unwrap();

        let subject = docs[0].subject.as_ref().unwrap();
        let patient = subject.resolved().and_then(|r| r.as_patient()).unwrap();
        assert_eq!(patient.identifier[0].value.as_deref(), Some("id1"));
    }

    #[test]
    fn test_contained_author_is_resolved_with_nested_references() {
        let raw = json!({
            "resourceType": "DocumentReference",
            "id": "d1",
            "contained": [
                {"resourceType": "Practitioner", "id": "pr", "name": [{"family": "Smith"}]},
                {"resourceType": "PractitionerRole", "id": "role", "practitioner": {"reference": "#pr"}}
            ],
            "author": [{"reference": "#role"}]
        });
        let docs = Bundle::from_resources([raw])
            .resources_of::<DocumentReference>()
            .unwrap();

        let Some(ResolvedResource::PractitionerRole(role)) = docs[0].author[0].resolved() else {
            panic!("role not resolved");
        };
        assert!(matches!(
            role.practitioner.as_ref().and_then(|p| p.resolved()),
            Some(ResolvedResource::Practitioner(_))
        ));
        assert_eq!(docs[0].contained.len(), 2);
    }

    #[test]
    fn test_list_items_resolve_to_included_documents() {
        let folder = json!({
            "resourceType": "List",
            "id": "f1",
            "identifier": [{"value": "urn:uuid:folder"}],
            "entry": [
                {"item": {"reference": "DocumentReference/d1"}},
                {"item": {"reference": "DocumentReference/missing"}}
            ]
        });
        let page = Bundle::from_resources([folder, doc("d1", "urn:uuid:doc")]);
        let folders = page.resources_of::<MhdFolder>().unwrap();

        let items: Vec<_> = folders[0]
            .entry
            .iter()
            .map(|entry| entry.item.resolved().and_then(|r| r.entry_uuid()))
            .collect();
        assert_eq!(items, vec![Some("urn:uuid:doc"), None]);
        assert_eq!(folders[0].entry_uuid(), Some("urn:uuid:folder"));
    }

    #[test]
    fn test_full_url_lookup() {
        let mut page = Bundle::from_resources([patient()]);
        page.entry[0].full_url = Some("urn:uuid:patient-entry".to_string());
        let index = PageIndex::new(&page.entry);
        let resolver = ReferenceResolver::for_page(&index);

        assert!(resolver.lookup("urn:uuid:patient-entry").is_some());
        assert!(resolver.lookup("http://server/fhir/Patient/p1").is_some());
        assert!(resolver.lookup("#p1").is_none());
    }

    #[test]
    fn test_undecodable_resource_is_an_error() {
        let page = Bundle::from_resources([json!({
            "resourceType": "DocumentReference",
            "identifier": "not-a-list"
        })]);
        let err = page.resources_of::<DocumentReference>().unwrap_err();
        assert!(matches!(err, StorageError::InvalidBundle { .. }));
    }
}
