//! Association reconstruction.
//!
//! The backend stores no associations. They are derived per query from what
//! was retrieved:
//! - list entries give `HAS_MEMBER` edges from the list to the entry's item
//! - `DocumentReference.relatesTo` gives document to document edges
//! - a submission set entry naming an association id gives a `HAS_MEMBER`
//!   edge from the submission set to that association
//!
//! All functions are pure. Association ids come from the list entry or the
//! `relatesTo` element when the backend assigned one and are minted
//! otherwise.

use std::ops::Deref;

use xdsfhir_core::vocabulary::relationship_from_backend;
use xdsfhir_core::{Association, generate_urn_uuid};
use xdsfhir_storage::{
    DocumentReference, FhirResource, Identified, ListEntry, ListResource, RelatesTo,
    ResolvedResource,
};

fn entry_id(entry: &ListEntry) -> String {
    entry.id.clone().unwrap_or_else(generate_urn_uuid)
}

fn relation_id(relation: &RelatesTo) -> String {
    relation.id.clone().unwrap_or_else(generate_urn_uuid)
}

/// `HAS_MEMBER` edges from each container to the entries that point at one
/// of `members`.
pub fn memberships<C, T>(containers: &[C], members: &[T]) -> Vec<Association>
where
    C: Deref<Target = ListResource>,
    T: FhirResource + Identified,
{
    let mut associations = Vec::new();
    for container in containers {
        let Some(source) = container.entry_uuid() else {
            continue;
        };
        for entry in &container.entry {
            for member in members.iter().filter(|member| member.is_target_of(&entry.item)) {
                if let Some(target) = member.entry_uuid() {
                    associations.push(Association::original_member(entry_id(entry), source, target));
                }
            }
        }
    }
    associations
}

/// Typed edges between documents of the same result. Relation codes without
/// a registry association type are skipped.
pub fn document_relationships(documents: &[DocumentReference]) -> Vec<Association> {
    let mut associations = Vec::new();
    for document in documents {
        let Some(source) = document.entry_uuid() else {
            continue;
        };
        for relation in &document.relates_to {
            let Some(association_type) = relationship_from_backend(&relation.code) else {
                continue;
            };
            for target in documents.iter().filter(|doc| doc.is_target_of(&relation.target)) {
                if let Some(target_uuid) = target.entry_uuid() {
                    associations.push(Association::new(
                        association_type,
                        relation_id(relation),
                        source,
                        target_uuid,
                    ));
                }
            }
        }
    }
    associations
}

/// `HAS_MEMBER` edges from submission sets to associations they organize.
///
/// An entry organizes an association when the value of its item identifier
/// equals the association's id.
pub fn association_memberships<C>(submission_sets: &[C], associations: &[Association]) -> Vec<Association>
where
    C: Deref<Target = ListResource>,
{
    let mut derived = Vec::new();
    for submission_set in submission_sets {
        let Some(source) = submission_set.entry_uuid() else {
            continue;
        };
        for entry in &submission_set.entry {
            let Some(value) = entry
                .item
                .identifier
                .as_ref()
                .and_then(|id| id.value.as_deref())
            else {
                continue;
            };
            for association in associations.iter().filter(|assoc| assoc.entry_uuid == value) {
                derived.push(Association::original_member(
                    entry_id(entry),
                    source,
                    &association.entry_uuid,
                ));
            }
        }
    }
    derived
}

/// All associations among a retrieved set of submission sets, folders and
/// documents, in derivation order: submission set memberships, folder
/// memberships, document relationships, then the submission set memberships
/// of those associations.
pub fn reconstruct<S, F>(
    submission_sets: &[S],
    folders: &[F],
    documents: &[DocumentReference],
) -> Vec<Association>
where
    S: Deref<Target = ListResource>,
    F: Deref<Target = ListResource> + FhirResource + Identified,
{
    let mut associations = memberships(submission_sets, documents);
    associations.extend(memberships(submission_sets, folders));
    associations.extend(memberships(folders, documents));
    associations.extend(document_relationships(documents));
    let organized = association_memberships(submission_sets, &associations);
    associations.extend(organized);
    associations
}

/// Edges from the lists on a result page that contain `document`.
pub fn containers_of(document: &DocumentReference, lists: &[ListResource]) -> Vec<Association> {
    let Some(target) = document.entry_uuid() else {
        return Vec::new();
    };
    let mut associations = Vec::new();
    for list in lists {
        let Some(source) = list.entry_uuid() else {
            continue;
        };
        for entry in list.entry.iter().filter(|entry| document.is_target_of(&entry.item)) {
            associations.push(Association::original_member(entry_id(entry), source, target));
        }
    }
    associations
}

/// Typed edges to the related documents resolved on the same page.
pub fn resolved_relationships(document: &DocumentReference) -> Vec<Association> {
    let Some(source) = document.entry_uuid() else {
        return Vec::new();
    };
    document
        .relates_to
        .iter()
        .filter_map(|relation| {
            let association_type = relationship_from_backend(&relation.code)?;
            let target = relation.target.resolved()?.as_document()?.entry_uuid()?;
            Some(Association::new(
                association_type,
                relation_id(relation),
                source,
                target,
            ))
        })
        .collect()
}

/// Edges from a folder to the documents its entries resolved to.
pub fn resolved_folder_members(folder: &ListResource) -> Vec<Association> {
    resolved_members(folder, false, |item| {
        item.as_document().and_then(|doc| doc.entry_uuid())
    })
}

/// Edges from a submission set to everything its entries name: resolved
/// documents and lists, and items given by identifier only.
pub fn resolved_submission_set_members(submission_set: &ListResource) -> Vec<Association> {
    resolved_members(submission_set, true, ResolvedResource::entry_uuid)
}

fn resolved_members(
    list: &ListResource,
    by_identifier: bool,
    target_of: impl Fn(&ResolvedResource) -> Option<&str>,
) -> Vec<Association> {
    let Some(source) = list.entry_uuid() else {
        return Vec::new();
    };
    list.entry
        .iter()
        .filter_map(|entry| {
            let target = match entry.item.resolved() {
                Some(resolved) => target_of(resolved),
                None if by_identifier => entry
                    .item
                    .identifier
                    .as_ref()
                    .and_then(|id| id.value.as_deref()),
                None => None,
            }?;
            Some(Association::original_member(entry_id(entry), source, target))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use xdsfhir_core::AssociationType;
    use xdsfhir_storage::{Bundle, MhdFolder, MhdSubmissionSet};

    fn doc(id: &str, relates_to: Value) -> Value {
        json!({
            "resourceType": "DocumentReference",
            "id": id,
            "identifier": [{"use": "official", "value": format!("urn:uuid:{id}")}],
            "relatesTo": relates_to
        })
    }

    fn list(id: &str, entries: Value) -> Value {
        json!({
            "resourceType": "List",
            "id": id,
            "identifier": [{"use": "official", "value": format!("urn:uuid:{id}")}],
            "entry": entries
        })
    }

    fn page(resources: Vec<Value>) -> Bundle {
        Bundle::from_resources(resources)
    }

    #[test]
    fn test_memberships_reuse_entry_ids() {
        let page = page(vec![
            list(
                "f1",
                json!([
                    {"id": "urn:uuid:assoc-1", "item": {"reference": "DocumentReference/d1"}},
                    {"item": {"reference": "DocumentReference/d2"}},
                    {"item": {"reference": "DocumentReference/elsewhere"}}
                ]),
            ),
            doc("d1", json!([])),
            doc("d2", json!([])),
        ]);
        let folders = page.resources_of::<MhdFolder>().unwrap();
        let docs = page.resources_of::<DocumentReference>().unwrap();

        let associations = memberships(&folders, &docs);
        assert_eq!(associations.len(), 2);
        assert_eq!(associations[0].entry_uuid, "urn:uuid:assoc-1");
        assert_eq!(associations[0].source_uuid, "urn:uuid:f1");
        assert_eq!(associations[0].target_uuid, "urn:uuid:d1");
        assert!(associations[1].entry_uuid.starts_with("urn:uuid:"));
        assert_eq!(associations[1].target_uuid, "urn:uuid:d2");
        assert!(
            associations
                .iter()
                .all(|a| a.association_type == AssociationType::HasMember)
        );
    }

    #[test]
    fn test_document_relationships_map_codes() {
        let page = page(vec![
            doc(
                "d1",
                json!([
                    {"id": "urn:uuid:rplc", "code": "replaces", "target": {"reference": "DocumentReference/d2"}},
                    {"code": "unknown-code", "target": {"reference": "DocumentReference/d2"}},
                    {"code": "appends", "target": {"reference": "DocumentReference/absent"}}
                ]),
            ),
            doc("d2", json!([])),
        ]);
        let docs = page.resources_of::<DocumentReference>().unwrap();

        let associations = document_relationships(&docs);
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].association_type, AssociationType::Replace);
        assert_eq!(associations[0].entry_uuid, "urn:uuid:rplc");
        assert_eq!(associations[0].source_uuid, "urn:uuid:d1");
        assert_eq!(associations[0].target_uuid, "urn:uuid:d2");
    }

    #[test]
    fn test_submission_set_organizes_association() {
        let page = page(vec![
            list(
                "ss1",
                json!([
                    {"id": "urn:uuid:m1", "item": {"reference": "DocumentReference/d1"}},
                    {"id": "urn:uuid:m2", "item": {"identifier": {"value": "urn:uuid:rplc"}}}
                ]),
            ),
            doc(
                "d1",
                json!([{"id": "urn:uuid:rplc", "code": "replaces", "target": {"reference": "DocumentReference/d0"}}]),
            ),
            doc("d0", json!([])),
        ]);
        let sets = page.resources_of::<MhdSubmissionSet>().unwrap();
        let docs = page.resources_of::<DocumentReference>().unwrap();

        let mut associations = memberships(&sets, &docs);
        associations.extend(document_relationships(&docs));
        let organized = association_memberships(&sets, &associations);
        associations.extend(organized);

        let edges: Vec<_> = associations
            .iter()
            .map(|a| (a.association_type, a.source_uuid.as_str(), a.target_uuid.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                (AssociationType::HasMember, "urn:uuid:ss1", "urn:uuid:d1"),
                (AssociationType::Replace, "urn:uuid:d1", "urn:uuid:d0"),
                (AssociationType::HasMember, "urn:uuid:ss1", "urn:uuid:rplc"),
            ]
        );
        assert_eq!(associations[2].entry_uuid, "urn:uuid:m2");
    }

    #[test]
    fn test_reconstruct_orders_derivations() {
        let page = page(vec![
            list(
                "ss1",
                json!([
                    {"item": {"reference": "DocumentReference/d1"}},
                    {"item": {"reference": "List/f1"}},
                    {"item": {"identifier": {"value": "urn:uuid:rplc"}}}
                ]),
            ),
            list("f1", json!([{"item": {"reference": "DocumentReference/d1"}}])),
            doc(
                "d1",
                json!([{"id": "urn:uuid:rplc", "code": "replaces", "target": {"reference": "DocumentReference/d0"}}]),
            ),
            doc("d0", json!([])),
        ]);
        let sets: Vec<MhdSubmissionSet> = page
            .resources_of::<MhdSubmissionSet>()
            .unwrap()
            .into_iter()
            .filter(|set| set.id.as_deref() == Some("ss1"))
            .collect();
        let folders: Vec<MhdFolder> = page
            .resources_of::<MhdFolder>()
            .unwrap()
            .into_iter()
            .filter(|folder| folder.id.as_deref() == Some("f1"))
            .collect();
        let docs = page.resources_of::<DocumentReference>().unwrap();

        let associations = reconstruct(&sets, &folders, &docs);
        let edges: Vec<_> = associations
            .iter()
            .map(|a| (a.association_type, a.source_uuid.as_str(), a.target_uuid.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                (AssociationType::HasMember, "urn:uuid:ss1", "urn:uuid:d1"),
                (AssociationType::HasMember, "urn:uuid:ss1", "urn:uuid:f1"),
                (AssociationType::HasMember, "urn:uuid:f1", "urn:uuid:d1"),
                (AssociationType::Replace, "urn:uuid:d1", "urn:uuid:d0"),
                (AssociationType::HasMember, "urn:uuid:ss1", "urn:uuid:rplc"),
            ]
        );
    }

    #[test]
    fn test_containers_of_included_lists() {
        let page = page(vec![
            doc("d1", json!([])),
            list("ss1", json!([{"item": {"reference": "DocumentReference/d1"}}])),
            list("f1", json!([{"item": {"reference": "DocumentReference/other"}}])),
        ]);
        let docs = page.resources_of::<DocumentReference>().unwrap();
        let lists = page.resources_of::<ListResource>().unwrap();

        let associations = containers_of(&docs[0], &lists);
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].source_uuid, "urn:uuid:ss1");
    }

    #[test]
    fn test_resolved_members() {
        let page = page(vec![
            list(
                "ss1",
                json!([
                    {"item": {"reference": "DocumentReference/d1"}},
                    {"item": {"reference": "List/f1"}},
                    {"item": {"identifier": {"value": "urn:uuid:assoc-9"}}}
                ]),
            ),
            doc("d1", json!([])),
            list("f1", json!([])),
        ]);
        let sets = page.resources_of::<MhdSubmissionSet>().unwrap();
        let set = sets
            .iter()
            .find(|set| set.id.as_deref() == Some("ss1"))
            .unwrap();

        let targets: Vec<_> = resolved_submission_set_members(set)
            .into_iter()
            .map(|a| a.target_uuid)
            .collect();
        assert_eq!(targets, vec!["urn:uuid:d1", "urn:uuid:f1", "urn:uuid:assoc-9"]);

        // folders only keep resolved documents
        let targets: Vec<_> = resolved_folder_members(set)
            .into_iter()
            .map(|a| a.target_uuid)
            .collect();
        assert_eq!(targets, vec!["urn:uuid:d1"]);
    }

    #[test]
    fn test_resolved_relationships() {
        let page = page(vec![
            doc(
                "d1",
                json!([{"code": "signs", "target": {"reference": "DocumentReference/d2"}}]),
            ),
            doc("d2", json!([])),
        ]);
        let docs = page.resources_of::<DocumentReference>().unwrap();

        let associations = resolved_relationships(&docs[0]);
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].association_type, AssociationType::Signs);
        assert!(resolved_relationships(&docs[1]).is_empty());
    }
}
