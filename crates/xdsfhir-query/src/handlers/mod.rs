//! One handler per stored query shape.
//!
//! Handlers build the backend searches for their query, map what comes back
//! through the [`RegistryMapper`] into the [`ResponseCollector`] and derive
//! the associations among the accepted resources.

mod composite;
mod documents;
mod lists;

use std::collections::HashSet;

use xdsfhir_core::{Association, Identifiable, QueryResponse, StoredQuery};
use xdsfhir_mapping::RegistryMapper;
use xdsfhir_storage::{
    DocumentReference, FhirBackend, FhirResource, MhdFolder, MhdSubmissionSet, SearchParams,
};

use crate::author::AuthorMatcher;
use crate::collector::ResponseCollector;
use crate::cursor::{Pages, PagingCursor};
use crate::error::QueryError;

/// Working state of one query invocation.
pub(crate) struct QueryContext<'a> {
    backend: &'a dyn FhirBackend,
    mapper: &'a dyn RegistryMapper,
    collector: ResponseCollector,
}

impl<'a> QueryContext<'a> {
    pub(crate) fn new(
        backend: &'a dyn FhirBackend,
        mapper: &'a dyn RegistryMapper,
        collector: ResponseCollector,
    ) -> Self {
        Self {
            backend,
            mapper,
            collector,
        }
    }

    pub(crate) fn finish(self) -> QueryResponse {
        self.collector.finish()
    }

    fn add_associations(&mut self, associations: Vec<Association>) {
        self.collector.add_associations(associations);
    }

    async fn pages(&self, params: &SearchParams) -> Result<Pages<'a>, QueryError> {
        tracing::debug!(
            search = %params,
            backend = self.backend.backend_name(),
            "Searching backend"
        );
        let first = self.backend.search(params).await?;
        Ok(Pages::new(self.backend, first))
    }

    async fn search<T: FhirResource>(
        &self,
        params: &SearchParams,
    ) -> Result<PagingCursor<'a, T>, QueryError> {
        tracing::debug!(
            search = %params,
            backend = self.backend.backend_name(),
            "Searching backend"
        );
        let first = self.backend.search(params).await?;
        Ok(PagingCursor::new(self.backend, first))
    }

    /// Every match of a search, unmapped and uncapped. Used for containers
    /// that only contribute associations.
    async fn fetch_all<T: FhirResource>(&self, params: &SearchParams) -> Result<Vec<T>, QueryError> {
        self.search::<T>(params).await?.collect_all().await
    }

    /// Maps the documents of a search into the response until the cap is
    /// reached. Returns the backend resources that were accepted.
    async fn map_documents(
        &mut self,
        params: &SearchParams,
        authors: &AuthorMatcher,
    ) -> Result<Vec<DocumentReference>, QueryError> {
        let mut cursor = self.search::<DocumentReference>(params).await?;
        let mut accepted = Vec::new();
        while !self.collector.cap_reached() {
            let Some(doc) = cursor.try_next().await? else {
                break;
            };
            if self.accept_document(&doc, authors) {
                accepted.push(doc);
            }
        }
        Ok(accepted)
    }

    /// Same as [`Self::map_documents`] over documents already retrieved.
    fn map_retrieved_documents(&mut self, documents: Vec<DocumentReference>) -> Vec<DocumentReference> {
        let authors = AuthorMatcher::default();
        let mut accepted = Vec::new();
        for doc in documents {
            if self.collector.cap_reached() {
                break;
            }
            if self.accept_document(&doc, &authors) {
                accepted.push(doc);
            }
        }
        accepted
    }

    fn accept_document(&mut self, doc: &DocumentReference, authors: &AuthorMatcher) -> bool {
        match self.mapper.map_document(doc) {
            Some(entry) if authors.matches(&entry.authors) => {
                self.collector.add_document(entry);
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!(id = ?doc.id, "DocumentReference dropped by mapper");
                false
            }
        }
    }

    async fn map_folders(&mut self, params: &SearchParams) -> Result<Vec<MhdFolder>, QueryError> {
        let mut cursor = self.search::<MhdFolder>(params).await?;
        let mut accepted = Vec::new();
        while !self.collector.cap_reached() {
            let Some(folder) = cursor.try_next().await? else {
                break;
            };
            match self.mapper.map_folder(&folder) {
                Some(mapped) => {
                    self.collector.add_folder(mapped);
                    accepted.push(folder);
                }
                None => tracing::debug!(id = ?folder.id, "Folder dropped by mapper"),
            }
        }
        Ok(accepted)
    }

    async fn map_submission_sets(
        &mut self,
        params: &SearchParams,
        authors: &AuthorMatcher,
    ) -> Result<Vec<MhdSubmissionSet>, QueryError> {
        let cursor = self.search::<MhdSubmissionSet>(params).await?;
        self.map_submission_set_cursor(cursor, authors).await
    }

    async fn map_submission_set_cursor(
        &mut self,
        mut cursor: PagingCursor<'a, MhdSubmissionSet>,
        authors: &AuthorMatcher,
    ) -> Result<Vec<MhdSubmissionSet>, QueryError> {
        let mut accepted = Vec::new();
        while !self.collector.cap_reached() {
            let Some(set) = cursor.try_next().await? else {
                break;
            };
            if self.accept_submission_set(&set, authors) {
                accepted.push(set);
            }
        }
        Ok(accepted)
    }

    fn map_retrieved_submission_sets(&mut self, sets: Vec<MhdSubmissionSet>) -> Vec<MhdSubmissionSet> {
        let authors = AuthorMatcher::default();
        let mut accepted = Vec::new();
        for set in sets {
            if self.collector.cap_reached() {
                break;
            }
            if self.accept_submission_set(&set, &authors) {
                accepted.push(set);
            }
        }
        accepted
    }

    fn accept_submission_set(&mut self, set: &MhdSubmissionSet, authors: &AuthorMatcher) -> bool {
        match self.mapper.map_submission_set(set) {
            Some(mapped) if authors.matches(&mapped.authors) => {
                self.collector.add_submission_set(mapped);
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!(id = ?set.id, "Submission set dropped by mapper");
                false
            }
        }
    }
}

/// Drops later occurrences of the same backend resource, keeping the order
/// of first retrieval. Resources without a logical id are kept.
pub(crate) fn dedup_by_identity<T: FhirResource>(resources: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    resources
        .into_iter()
        .filter(|resource| match resource.id() {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

fn require_patient(query: &'static str, patient_id: &Identifiable) -> Result<(), QueryError> {
    if patient_id.id.is_empty() {
        return Err(QueryError::invalid_query(query, "patientId is required"));
    }
    Ok(())
}

fn require_identifiers(query: &'static str, identifiers: &[String]) -> Result<(), QueryError> {
    if identifiers.is_empty() {
        return Err(QueryError::invalid_query(
            query,
            "at least one uuid or uniqueId is required",
        ));
    }
    Ok(())
}

fn unsupported(query: &StoredQuery, reason: &'static str) -> QueryError {
    QueryError::Unsupported {
        query: query.kind(),
        reason,
    }
}

/// Runs the handler of `query`.
pub(crate) async fn dispatch(ctx: &mut QueryContext<'_>, query: &StoredQuery) -> Result<(), QueryError> {
    match query {
        StoredQuery::FindDocuments(q) => documents::find_documents(ctx, q).await,
        StoredQuery::FindDocumentsByReferenceId(q) => {
            documents::find_documents_by_reference_id(ctx, q).await
        }
        StoredQuery::GetDocuments(q) => documents::get_documents(ctx, q).await,
        StoredQuery::GetRelatedDocuments(q) => documents::get_related_documents(ctx, q).await,
        StoredQuery::GetDocumentsAndAssociations(q) => {
            documents::get_documents_and_associations(ctx, q).await
        }
        StoredQuery::FindFolders(q) => lists::find_folders(ctx, q).await,
        StoredQuery::GetFolders(q) => lists::get_folders(ctx, q).await,
        StoredQuery::GetFoldersForDocument(q) => lists::get_folders_for_document(ctx, q).await,
        StoredQuery::FindSubmissionSets(q) => lists::find_submission_sets(ctx, q).await,
        StoredQuery::GetSubmissionSets(q) => lists::get_submission_sets(ctx, q).await,
        StoredQuery::GetAll(q) => composite::get_all(ctx, q).await,
        StoredQuery::GetSubmissionSetAndContents(q) => {
            composite::get_submission_set_and_contents(ctx, q).await
        }
        StoredQuery::GetFolderAndContents(q) => composite::get_folder_and_contents(ctx, q).await,
        StoredQuery::GetAssociations(q) => composite::get_associations(ctx, q).await,

        StoredQuery::FindDocumentsForMultiplePatients
        | StoredQuery::FindFoldersForMultiplePatients => Err(unsupported(
            query,
            "multi-patient queries are not offered by this registry",
        )),
        StoredQuery::FindDocumentsByTitle => {
            Err(unsupported(query, "title search is not offered by this registry"))
        }
        StoredQuery::Fetch => Err(unsupported(
            query,
            "on-demand document fetch is not offered by this registry",
        )),
        StoredQuery::FindMedicationTreatmentPlans
        | StoredQuery::FindPrescriptions
        | StoredQuery::FindDispenses
        | StoredQuery::FindMedicationAdministrations
        | StoredQuery::FindPrescriptionsForValidation
        | StoredQuery::FindPrescriptionsForDispense
        | StoredQuery::FindMedicationList => Err(unsupported(
            query,
            "community pharmacy queries are outside the registry profile",
        )),
        StoredQuery::SubscriptionForDocumentEntry
        | StoredQuery::SubscriptionForFolder
        | StoredQuery::SubscriptionForSubmissionSet
        | StoredQuery::SubscriptionForPatient
        | StoredQuery::SubscriptionForFolderDocuments => Err(unsupported(
            query,
            "subscription queries are outside the registry profile",
        )),
    }
}
