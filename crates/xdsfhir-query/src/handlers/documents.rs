use xdsfhir_core::vocabulary::to_urn_coded;
use xdsfhir_core::{FindDocumentsByReferenceIdQuery, FindDocumentsQuery, GetByIdQuery, GetFromDocumentQuery};
use xdsfhir_search::parameters::{
    CATEGORY, DATE, EVENT, FACILITY, FORMAT, IDENTIFIER, PERIOD, SECURITY_LABEL, SETTING, TYPE,
};
use xdsfhir_search::{IncludeParam, ItemTarget, chaining, date, include, templates, token};
use xdsfhir_storage::{DocumentReference, MhdFolder, MhdSubmissionSet, SearchParams};

use super::{QueryContext, dedup_by_identity, require_identifiers, require_patient};
use crate::associations::{document_relationships, memberships};
use crate::author::AuthorMatcher;
use crate::error::QueryError;

/// Document search for every predicate of a FindDocuments query except the
/// author filter.
pub(super) fn find_documents_search(query: &FindDocumentsQuery) -> SearchParams {
    let mut search = templates::documents();
    token::patient(&mut search, &query.patient_id);
    token::codes(&mut search, CATEGORY, &query.class_codes);
    token::codes(&mut search, TYPE, &query.type_codes);
    token::codes(&mut search, SETTING, &query.practice_setting_codes);
    token::codes(&mut search, FACILITY, &query.healthcare_facility_type_codes);
    token::codes(&mut search, FORMAT, &query.format_codes);
    token::status(&mut search, &query.status);
    token::code_list(&mut search, EVENT, &query.event_codes);
    token::code_list(&mut search, SECURITY_LABEL, &query.confidentiality_codes);
    date::time_range(&mut search, DATE, &query.creation_time);
    date::time_range(&mut search, PERIOD, &query.service_start_time);
    date::time_range(&mut search, PERIOD, &query.service_stop_time);
    search
}

/// Documents carrying one of the (URN coded) identifiers.
pub(super) fn documents_by_identifier(identifiers: &[String]) -> SearchParams {
    let mut search = templates::documents();
    token::uri_identifiers(&mut search, IDENTIFIER, identifiers);
    search
}

pub(super) async fn find_documents(
    ctx: &mut QueryContext<'_>,
    query: &FindDocumentsQuery,
) -> Result<(), QueryError> {
    require_patient("FindDocuments", &query.patient_id)?;
    let authors = AuthorMatcher::new(&query.author_persons)?;
    ctx.map_documents(&find_documents_search(query), &authors).await?;
    Ok(())
}

pub(super) async fn find_documents_by_reference_id(
    ctx: &mut QueryContext<'_>,
    query: &FindDocumentsByReferenceIdQuery,
) -> Result<(), QueryError> {
    require_patient("FindDocumentsByReferenceId", &query.documents.patient_id)?;
    let authors = AuthorMatcher::new(&query.documents.author_persons)?;
    let mut search = find_documents_search(&query.documents);
    token::reference_ids(&mut search, &query.reference_ids);
    ctx.map_documents(&search, &authors).await?;
    Ok(())
}

pub(super) async fn get_documents(
    ctx: &mut QueryContext<'_>,
    query: &GetByIdQuery,
) -> Result<(), QueryError> {
    let identifiers = token::urn_identifiers(query.identifiers());
    require_identifiers("GetDocuments", &identifiers)?;
    ctx.map_documents(&documents_by_identifier(&identifiers), &AuthorMatcher::default())
        .await?;
    Ok(())
}

/// The seed document and everything it relates to, in both directions.
///
/// Two searches: documents that are the seed and carry a `relatesTo`, and
/// documents whose `relatesTo` points at the seed. Both include the related
/// documents, so either side of each relationship is on the result page.
pub(super) async fn get_related_documents(
    ctx: &mut QueryContext<'_>,
    query: &GetFromDocumentQuery,
) -> Result<(), QueryError> {
    let Some(seed) = query.seed() else {
        return Err(QueryError::invalid_query(
            "GetRelatedDocuments",
            "uuid or uniqueId is required",
        ));
    };
    let seed = [to_urn_coded(seed)];

    let mut outgoing = templates::documents();
    include::include(&mut outgoing, IncludeParam::DOCUMENT_RELATESTO);
    token::uri_identifiers(&mut outgoing, IDENTIFIER, &seed);
    chaining::relates_to_present(&mut outgoing);

    let mut incoming = templates::documents();
    include::include(&mut incoming, IncludeParam::DOCUMENT_RELATESTO);
    chaining::relates_to_identifier(&mut incoming, &seed);
    chaining::relates_to_present(&mut incoming);

    let mut related: Vec<DocumentReference> = ctx.fetch_all(&outgoing).await?;
    related.extend(ctx.fetch_all::<DocumentReference>(&incoming).await?);

    let accepted = ctx.map_retrieved_documents(dedup_by_identity(related));
    ctx.add_associations(document_relationships(&accepted));
    Ok(())
}

/// The documents plus every association touching them: memberships in
/// folders and submission sets, and relationships among the documents.
pub(super) async fn get_documents_and_associations(
    ctx: &mut QueryContext<'_>,
    query: &GetByIdQuery,
) -> Result<(), QueryError> {
    let identifiers = token::urn_identifiers(query.identifiers());
    require_identifiers("GetDocumentsAndAssociations", &identifiers)?;

    let documents = ctx
        .map_documents(&documents_by_identifier(&identifiers), &AuthorMatcher::default())
        .await?;

    let mut folder_search = templates::folders();
    chaining::item_identifier(&mut folder_search, ItemTarget::DocumentReference, &identifiers);
    let folders: Vec<MhdFolder> = ctx.fetch_all(&folder_search).await?;

    let mut submission_set_search = templates::submission_sets();
    chaining::item_identifier(
        &mut submission_set_search,
        ItemTarget::DocumentReference,
        &identifiers,
    );
    let submission_sets: Vec<MhdSubmissionSet> = ctx.fetch_all(&submission_set_search).await?;

    let mut associations = memberships(&folders, &documents);
    associations.extend(memberships(&submission_sets, &documents));
    associations.extend(document_relationships(&documents));
    ctx.add_associations(associations);
    Ok(())
}
