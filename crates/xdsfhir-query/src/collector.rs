//! Response assembly: versioning, result cap and reference projection.

use xdsfhir_core::{
    Association, DocumentEntry, ErrorCode, ErrorInfo, Folder, MetadataObject, ObjectReference,
    QueryResponse, QueryReturnType, Status, SubmissionSet,
};

/// Accumulates the objects and associations of one query.
///
/// Every accepted object gets default versioning. In reference mode objects
/// and associations land in `references` only. Objects count against the cap
/// in both modes.
#[derive(Debug)]
pub struct ResponseCollector {
    response: QueryResponse,
    max_results: usize,
    object_refs: bool,
    objects: usize,
}

impl ResponseCollector {
    pub fn new(max_results: usize, return_type: QueryReturnType) -> Self {
        Self {
            response: QueryResponse::new(Status::Success),
            max_results,
            object_refs: return_type == QueryReturnType::ObjectRef,
            objects: 0,
        }
    }

    /// Whether more objects were accepted than allowed. Marks the response
    /// as a partial success the first time this is seen.
    pub fn cap_reached(&mut self) -> bool {
        if self.objects <= self.max_results {
            return false;
        }
        if self.response.status != Status::PartialSuccess {
            tracing::warn!(
                max_results = self.max_results,
                "Result cap exceeded, truncating response"
            );
            self.response.status = Status::PartialSuccess;
            self.response.errors = vec![ErrorInfo::warning(
                ErrorCode::TooManyResults,
                format!("Result exceed maximum of {}", self.max_results),
            )];
        }
        true
    }

    pub fn add_document(&mut self, mut document: DocumentEntry) {
        document.assign_default_versioning();
        if !self.project(&document) {
            self.response.document_entries.push(document);
        }
    }

    pub fn add_folder(&mut self, mut folder: Folder) {
        folder.assign_default_versioning();
        if !self.project(&folder) {
            self.response.folders.push(folder);
        }
    }

    pub fn add_submission_set(&mut self, mut submission_set: SubmissionSet) {
        submission_set.assign_default_versioning();
        if !self.project(&submission_set) {
            self.response.submission_sets.push(submission_set);
        }
    }

    pub fn add_associations(&mut self, associations: Vec<Association>) {
        if self.object_refs {
            self.response.references.extend(
                associations
                    .into_iter()
                    .map(|association| ObjectReference::new(association.entry_uuid)),
            );
        } else {
            self.response.associations.extend(associations);
        }
    }

    /// Counts the object and, in reference mode, records its reference.
    /// Returns `true` when the object itself must not be kept.
    fn project(&mut self, object: &impl MetadataObject) -> bool {
        self.objects += 1;
        if self.object_refs {
            self.response
                .references
                .push(ObjectReference::new(object.entry_uuid()));
        }
        self.object_refs
    }

    pub fn finish(mut self) -> QueryResponse {
        self.cap_reached();
        self.response
    }
}
