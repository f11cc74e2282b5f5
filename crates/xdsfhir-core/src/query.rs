//! Stored query variants and their predicate fields.
//!
//! `StoredQuery` is a closed union; queries arrive as JSON tagged by `type`:
//!
//! ```json
//! { "type": "FindDocuments",
//!   "patientId": { "id": "id3", "assigningAuthority": "1.3" },
//!   "status": ["Approved"] }
//! ```

use serde::{Deserialize, Serialize};

use crate::metadata::{AvailabilityStatus, Code, Identifiable, ReferenceId};
use crate::time::Timestamp;

/// Nested code list: the outer list is AND-ed, each inner list is an OR group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryList<T> {
    pub outer: Vec<Vec<T>>,
}

impl<T> QueryList<T> {
    pub fn new(outer: Vec<Vec<T>>) -> Self {
        Self { outer }
    }

    pub fn is_empty(&self) -> bool {
        self.outer.iter().all(Vec::is_empty)
    }
}

/// Inclusive lower and exclusive upper bound on a time attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryReturnType {
    #[default]
    LeafClass,
    ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: StoredQuery,
    #[serde(default)]
    pub return_type: QueryReturnType,
}

impl QueryRequest {
    pub fn new(query: StoredQuery, return_type: QueryReturnType) -> Self {
        Self { query, return_type }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindDocumentsQuery {
    pub patient_id: Identifiable,
    pub class_codes: Vec<Code>,
    pub type_codes: Vec<Code>,
    pub practice_setting_codes: Vec<Code>,
    pub healthcare_facility_type_codes: Vec<Code>,
    pub format_codes: Vec<Code>,
    pub event_codes: QueryList<Code>,
    pub confidentiality_codes: QueryList<Code>,
    pub status: Vec<AvailabilityStatus>,
    pub creation_time: TimeRange,
    pub service_start_time: TimeRange,
    pub service_stop_time: TimeRange,
    /// SQL-LIKE patterns (`%`, `_`) on the author person name.
    pub author_persons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindDocumentsByReferenceIdQuery {
    #[serde(flatten)]
    pub documents: FindDocumentsQuery,
    #[serde(default)]
    pub reference_ids: QueryList<ReferenceId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindSubmissionSetsQuery {
    pub patient_id: Identifiable,
    pub source_ids: Vec<String>,
    pub submission_time: TimeRange,
    pub author_person: Option<String>,
    pub status: Vec<AvailabilityStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindFoldersQuery {
    pub patient_id: Identifiable,
    pub last_update_time: TimeRange,
    pub status: Vec<AvailabilityStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetAllQuery {
    pub patient_id: Identifiable,
    pub status_documents: Vec<AvailabilityStatus>,
    pub status_submission_sets: Vec<AvailabilityStatus>,
    pub status_folders: Vec<AvailabilityStatus>,
}

/// Lookup by entry UUIDs and / or unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetByIdQuery {
    pub uuids: Vec<String>,
    pub unique_ids: Vec<String>,
}

impl GetByIdQuery {
    /// Unique ids first, then UUIDs.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.unique_ids
            .iter()
            .chain(self.uuids.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetByUuidQuery {
    pub uuids: Vec<String>,
}

/// Lookup seeded by a single object, given by entry UUID or unique id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetFromDocumentQuery {
    pub uuid: Option<String>,
    pub unique_id: Option<String>,
}

impl GetFromDocumentQuery {
    /// Unique id first, then UUID.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.unique_id
            .iter()
            .chain(self.uuid.iter())
            .map(String::as_str)
    }

    /// The unique id when given, otherwise the UUID.
    pub fn seed(&self) -> Option<&str> {
        self.unique_id.as_deref().or(self.uuid.as_deref())
    }
}

/// Container lookup that also returns the container's documents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetContentsQuery {
    #[serde(flatten)]
    pub container: GetFromDocumentQuery,
    #[serde(default)]
    pub format_codes: Vec<Code>,
    #[serde(default)]
    pub confidentiality_codes: QueryList<Code>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoredQuery {
    FindDocuments(FindDocumentsQuery),
    FindDocumentsByReferenceId(FindDocumentsByReferenceIdQuery),
    FindSubmissionSets(FindSubmissionSetsQuery),
    FindFolders(FindFoldersQuery),
    GetAll(GetAllQuery),
    GetDocuments(GetByIdQuery),
    GetFolders(GetByIdQuery),
    GetAssociations(GetByUuidQuery),
    GetDocumentsAndAssociations(GetByIdQuery),
    GetSubmissionSets(GetByUuidQuery),
    GetSubmissionSetAndContents(GetContentsQuery),
    GetFolderAndContents(GetContentsQuery),
    GetFoldersForDocument(GetFromDocumentQuery),
    GetRelatedDocuments(GetFromDocumentQuery),

    // Shapes outside the registry profile served here.
    FindDocumentsForMultiplePatients,
    FindFoldersForMultiplePatients,
    FindDocumentsByTitle,
    Fetch,
    FindMedicationTreatmentPlans,
    FindPrescriptions,
    FindDispenses,
    FindMedicationAdministrations,
    FindPrescriptionsForValidation,
    FindPrescriptionsForDispense,
    FindMedicationList,
    SubscriptionForDocumentEntry,
    SubscriptionForFolder,
    SubscriptionForSubmissionSet,
    SubscriptionForPatient,
    SubscriptionForFolderDocuments,
}

impl StoredQuery {
    /// Variant name, as used in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FindDocuments(_) => "FindDocuments",
            Self::FindDocumentsByReferenceId(_) => "FindDocumentsByReferenceId",
            Self::FindSubmissionSets(_) => "FindSubmissionSets",
            Self::FindFolders(_) => "FindFolders",
            Self::GetAll(_) => "GetAll",
            Self::GetDocuments(_) => "GetDocuments",
            Self::GetFolders(_) => "GetFolders",
            Self::GetAssociations(_) => "GetAssociations",
            Self::GetDocumentsAndAssociations(_) => "GetDocumentsAndAssociations",
            Self::GetSubmissionSets(_) => "GetSubmissionSets",
            Self::GetSubmissionSetAndContents(_) => "GetSubmissionSetAndContents",
            Self::GetFolderAndContents(_) => "GetFolderAndContents",
            Self::GetFoldersForDocument(_) => "GetFoldersForDocument",
            Self::GetRelatedDocuments(_) => "GetRelatedDocuments",
            Self::FindDocumentsForMultiplePatients => "FindDocumentsForMultiplePatients",
            Self::FindFoldersForMultiplePatients => "FindFoldersForMultiplePatients",
            Self::FindDocumentsByTitle => "FindDocumentsByTitle",
            Self::Fetch => "Fetch",
            Self::FindMedicationTreatmentPlans => "FindMedicationTreatmentPlans",
            Self::FindPrescriptions => "FindPrescriptions",
            Self::FindDispenses => "FindDispenses",
            Self::FindMedicationAdministrations => "FindMedicationAdministrations",
            Self::FindPrescriptionsForValidation => "FindPrescriptionsForValidation",
            Self::FindPrescriptionsForDispense => "FindPrescriptionsForDispense",
            Self::FindMedicationList => "FindMedicationList",
            Self::SubscriptionForDocumentEntry => "SubscriptionForDocumentEntry",
            Self::SubscriptionForFolder => "SubscriptionForFolder",
            Self::SubscriptionForSubmissionSet => "SubscriptionForSubmissionSet",
            Self::SubscriptionForPatient => "SubscriptionForPatient",
            Self::SubscriptionForFolderDocuments => "SubscriptionForFolderDocuments",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_documents_from_json() {
        let query: StoredQuery = serde_json::from_value(json!({
            "type": "FindDocuments",
            "patientId": { "id": "id3", "assigningAuthority": "1.3" },
            "eventCodes": [[{ "code": "code7", "schemeName": "scheme7" }], []],
            "creationTime": { "from": "19800101", "to": "19810101" },
            "status": ["Approved", "Deprecated"]
        }))
        .unwrap();

        let StoredQuery::FindDocuments(find) = &query else {
            panic!("expected FindDocuments, got {query:?}");
        };
        assert_eq!(query.kind(), "FindDocuments");
        assert_eq!(find.patient_id.assigning_authority.as_deref(), Some("1.3"));
        assert_eq!(find.event_codes.outer.len(), 2);
        assert!(find.creation_time.from.is_some());
        assert!(find.service_start_time.from.is_none());
        assert!(find.class_codes.is_empty());
    }

    #[test]
    fn test_flattened_reference_id_query() {
        let query: StoredQuery = serde_json::from_value(json!({
            "type": "FindDocumentsByReferenceId",
            "patientId": { "id": "p1" },
            "referenceIds": [[{ "id": "ref1", "assigningAuthority": "1.2.3" }]]
        }))
        .unwrap();

        let StoredQuery::FindDocumentsByReferenceId(find) = query else {
            panic!("expected FindDocumentsByReferenceId");
        };
        assert_eq!(find.documents.patient_id.id, "p1");
        assert_eq!(find.reference_ids.outer[0][0].id, "ref1");
    }

    #[test]
    fn test_unsupported_variant_from_json() {
        let query: StoredQuery = serde_json::from_value(json!({ "type": "FindDispenses" })).unwrap();
        assert_eq!(query, StoredQuery::FindDispenses);
    }

    #[test]
    fn test_request_defaults_to_leaf_class() {
        let request: QueryRequest = serde_json::from_value(json!({
            "query": { "type": "GetDocuments", "uuids": ["urn:uuid:1"] }
        }))
        .unwrap();
        assert_eq!(request.return_type, QueryReturnType::LeafClass);
    }

    #[test]
    fn test_identifier_order() {
        let query = GetByIdQuery {
            uuids: vec!["urn:uuid:1.2.3.4".into()],
            unique_ids: vec!["12.21.34".into()],
        };
        assert_eq!(
            query.identifiers().collect::<Vec<_>>(),
            vec!["12.21.34", "urn:uuid:1.2.3.4"]
        );

        let seed = GetFromDocumentQuery {
            uuid: Some("urn:uuid:1".into()),
            unique_id: None,
        };
        assert_eq!(seed.seed(), Some("urn:uuid:1"));
    }

    #[test]
    fn test_query_list_emptiness() {
        assert!(QueryList::<Code>::default().is_empty());
        assert!(QueryList::<Code>::new(vec![vec![]]).is_empty());
        assert!(!QueryList::new(vec![vec![Code::new("c", "s")]]).is_empty());
    }
}
