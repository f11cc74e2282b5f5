use xdsfhir_core::vocabulary::to_urn_coded;
use xdsfhir_core::{
    FindFoldersQuery, FindSubmissionSetsQuery, GetByIdQuery, GetByUuidQuery, GetFromDocumentQuery,
};
use xdsfhir_search::parameters::{DATE, IDENTIFIER};
use xdsfhir_search::{ItemTarget, chaining, date, templates, token};
use xdsfhir_storage::{DocumentReference, MhdFolder, MhdSubmissionSet, SearchParams};

use super::{QueryContext, dedup_by_identity, require_identifiers, require_patient};
use crate::associations::memberships;
use crate::author::AuthorMatcher;
use crate::error::QueryError;

pub(super) fn find_folders_search(query: &FindFoldersQuery) -> SearchParams {
    let mut search = templates::folders();
    token::patient(&mut search, &query.patient_id);
    date::time_range(&mut search, DATE, &query.last_update_time);
    token::status(&mut search, &query.status);
    search
}

pub(super) fn find_submission_sets_search(query: &FindSubmissionSetsQuery) -> SearchParams {
    let mut search = templates::submission_sets();
    token::patient(&mut search, &query.patient_id);
    date::time_range(&mut search, DATE, &query.submission_time);
    token::status(&mut search, &query.status);
    token::source_ids(&mut search, &query.source_ids);
    search
}

pub(super) async fn find_folders(
    ctx: &mut QueryContext<'_>,
    query: &FindFoldersQuery,
) -> Result<(), QueryError> {
    require_patient("FindFolders", &query.patient_id)?;
    ctx.map_folders(&find_folders_search(query)).await?;
    Ok(())
}

pub(super) async fn get_folders(
    ctx: &mut QueryContext<'_>,
    query: &GetByIdQuery,
) -> Result<(), QueryError> {
    let identifiers = token::urn_identifiers(query.identifiers());
    require_identifiers("GetFolders", &identifiers)?;
    let mut search = templates::folders();
    token::uri_identifiers(&mut search, IDENTIFIER, &identifiers);
    ctx.map_folders(&search).await?;
    Ok(())
}

/// Folders with an entry pointing at the seed document.
pub(super) async fn get_folders_for_document(
    ctx: &mut QueryContext<'_>,
    query: &GetFromDocumentQuery,
) -> Result<(), QueryError> {
    let Some(seed) = query.seed() else {
        return Err(QueryError::invalid_query(
            "GetFoldersForDocument",
            "uuid or uniqueId is required",
        ));
    };
    let mut search = templates::folders();
    chaining::item_identifier(
        &mut search,
        ItemTarget::DocumentReference,
        &[to_urn_coded(seed)],
    );
    ctx.map_folders(&search).await?;
    Ok(())
}

pub(super) async fn find_submission_sets(
    ctx: &mut QueryContext<'_>,
    query: &FindSubmissionSetsQuery,
) -> Result<(), QueryError> {
    require_patient("FindSubmissionSets", &query.patient_id)?;
    let authors = AuthorMatcher::new(query.author_person.as_slice())?;
    ctx.map_submission_sets(&find_submission_sets_search(query), &authors)
        .await?;
    Ok(())
}

/// Submission sets containing any of the given objects, with the
/// memberships linking them.
///
/// The contained documents and folders are looked up only to derive the
/// `HAS_MEMBER` associations and are not part of the response.
pub(super) async fn get_submission_sets(
    ctx: &mut QueryContext<'_>,
    query: &GetByUuidQuery,
) -> Result<(), QueryError> {
    let identifiers = token::urn_identifiers(query.uuids.iter().map(String::as_str));
    require_identifiers("GetSubmissionSets", &identifiers)?;

    let mut containing_documents = templates::submission_sets();
    chaining::item_identifier(
        &mut containing_documents,
        ItemTarget::DocumentReference,
        &identifiers,
    );
    let mut containing_lists = templates::submission_sets();
    chaining::item_identifier(&mut containing_lists, ItemTarget::List, &identifiers);

    let mut candidates: Vec<MhdSubmissionSet> = ctx.fetch_all(&containing_documents).await?;
    candidates.extend(ctx.fetch_all::<MhdSubmissionSet>(&containing_lists).await?);
    let submission_sets = ctx.map_retrieved_submission_sets(dedup_by_identity(candidates));

    let mut document_search = templates::documents();
    token::uri_identifiers(&mut document_search, IDENTIFIER, &identifiers);
    let documents: Vec<DocumentReference> = ctx.fetch_all(&document_search).await?;

    let mut folder_search = templates::folders();
    token::uri_identifiers(&mut folder_search, IDENTIFIER, &identifiers);
    let folders: Vec<MhdFolder> = ctx.fetch_all(&folder_search).await?;

    let mut associations = memberships(&submission_sets, &documents);
    associations.extend(memberships(&submission_sets, &folders));
    ctx.add_associations(associations);
    Ok(())
}
