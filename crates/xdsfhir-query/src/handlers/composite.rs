//! Queries spanning more than one object kind.

use std::collections::HashSet;

use xdsfhir_core::vocabulary::to_urn_coded;
use xdsfhir_core::{GetAllQuery, GetByUuidQuery, GetContentsQuery};
use xdsfhir_search::parameters::{FORMAT, IDENTIFIER, SECURITY_LABEL};
use xdsfhir_search::{IncludeParam, include, reverse_chaining, templates, token};
use xdsfhir_storage::{
    DocumentReference, Identified, ListResource, MhdFolder, MhdSubmissionSet,
    SearchParams,
};

use super::{QueryContext, require_identifiers, require_patient};
use crate::associations::{
    containers_of, memberships, reconstruct, resolved_folder_members, resolved_relationships,
    resolved_submission_set_members,
};
use crate::author::AuthorMatcher;
use crate::error::QueryError;

/// Documents listed in any of the containers, narrowed by format and
/// confidentiality.
fn contents_search(query: &GetContentsQuery, containers: &[String]) -> SearchParams {
    let mut search = templates::documents();
    token::codes(&mut search, FORMAT, &query.format_codes);
    token::code_list(&mut search, SECURITY_LABEL, &query.confidentiality_codes);
    reverse_chaining::member_of_list(&mut search, containers);
    search
}

/// Everything known for a patient.
pub(super) async fn get_all(ctx: &mut QueryContext<'_>, query: &GetAllQuery) -> Result<(), QueryError> {
    require_patient("GetAll", &query.patient_id)?;

    let mut document_search = templates::documents();
    token::patient(&mut document_search, &query.patient_id);
    token::status(&mut document_search, &query.status_documents);

    let mut submission_set_search = templates::submission_sets();
    token::patient(&mut submission_set_search, &query.patient_id);
    token::status(&mut submission_set_search, &query.status_submission_sets);

    let mut folder_search = templates::folders();
    token::patient(&mut folder_search, &query.patient_id);
    token::status(&mut folder_search, &query.status_folders);

    let no_filter = AuthorMatcher::default();
    let documents = ctx.map_documents(&document_search, &no_filter).await?;
    let submission_sets = ctx
        .map_submission_sets(&submission_set_search, &no_filter)
        .await?;
    let folders = ctx.map_folders(&folder_search).await?;

    ctx.add_associations(reconstruct(&submission_sets, &folders, &documents));
    Ok(())
}

/// A submission set with the documents and folders it contains.
pub(super) async fn get_submission_set_and_contents(
    ctx: &mut QueryContext<'_>,
    query: &GetContentsQuery,
) -> Result<(), QueryError> {
    let identifiers = token::urn_identifiers(query.container.identifiers());
    require_identifiers("GetSubmissionSetAndContents", &identifiers)?;

    let mut submission_set_search = templates::submission_sets();
    token::uri_identifiers(&mut submission_set_search, IDENTIFIER, &identifiers);

    let mut folder_search = templates::folders();
    reverse_chaining::member_of_list(&mut folder_search, &identifiers);

    let no_filter = AuthorMatcher::default();
    let documents = ctx
        .map_documents(&contents_search(query, &identifiers), &no_filter)
        .await?;
    let folders = ctx.map_folders(&folder_search).await?;
    let submission_sets = ctx
        .map_submission_sets(&submission_set_search, &no_filter)
        .await?;

    ctx.add_associations(reconstruct(&submission_sets, &folders, &documents));
    Ok(())
}

/// A folder with the documents it contains.
pub(super) async fn get_folder_and_contents(
    ctx: &mut QueryContext<'_>,
    query: &GetContentsQuery,
) -> Result<(), QueryError> {
    let identifiers = token::urn_identifiers(query.container.identifiers());
    require_identifiers("GetFolderAndContents", &identifiers)?;

    let mut folder_search = templates::folders();
    token::uri_identifiers(&mut folder_search, IDENTIFIER, &identifiers);

    let documents = ctx
        .map_documents(&contents_search(query, &identifiers), &AuthorMatcher::default())
        .await?;
    let folders = ctx.map_folders(&folder_search).await?;

    ctx.add_associations(memberships(&folders, &documents));
    Ok(())
}

/// Associations touching any of the given objects, without the objects.
///
/// Each object kind is searched by its entry UUID with the neighbouring
/// resources included, and edges are read off the result pages directly.
pub(super) async fn get_associations(
    ctx: &mut QueryContext<'_>,
    query: &GetByUuidQuery,
) -> Result<(), QueryError> {
    require_identifiers("GetAssociations", &query.uuids)?;
    let wanted: HashSet<String> = query
        .uuids
        .iter()
        .flat_map(|uuid| [uuid.clone(), to_urn_coded(uuid)])
        .collect();
    let is_wanted = |uuid: Option<&str>| uuid.is_some_and(|uuid| wanted.contains(uuid));

    let mut document_search = templates::documents();
    include::include(&mut document_search, IncludeParam::DOCUMENT_RELATESTO);
    include::include(&mut document_search, IncludeParam::REV_LIST_ITEM);
    token::uri_identifiers(&mut document_search, IDENTIFIER, &query.uuids);

    let mut associations = Vec::new();
    let mut pages = ctx.pages(&document_search).await?;
    while let Some(page) = pages.next_page().await? {
        let lists = page.resources_of::<ListResource>()?;
        for document in page.resources_of::<DocumentReference>()? {
            if !is_wanted(document.entry_uuid()) {
                continue;
            }
            associations.extend(containers_of(&document, &lists));
            associations.extend(resolved_relationships(&document));
        }
    }

    let mut folder_search = templates::folders();
    include::include(&mut folder_search, IncludeParam::LIST_ITEM);
    token::uri_identifiers(&mut folder_search, IDENTIFIER, &query.uuids);
    for folder in ctx.fetch_all::<MhdFolder>(&folder_search).await? {
        if is_wanted(folder.entry_uuid()) {
            associations.extend(resolved_folder_members(&folder));
        }
    }

    let mut submission_set_search = templates::submission_sets();
    include::include(&mut submission_set_search, IncludeParam::LIST_ITEM);
    token::uri_identifiers(&mut submission_set_search, IDENTIFIER, &query.uuids);
    for submission_set in ctx
        .fetch_all::<MhdSubmissionSet>(&submission_set_search)
        .await?
    {
        if is_wanted(submission_set.entry_uuid()) {
            associations.extend(resolved_submission_set_members(&submission_set));
        }
    }

    tracing::debug!(
        associations = associations.len(),
        "Associations read from result pages"
    );
    ctx.add_associations(associations);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdsfhir_core::{Code, GetFromDocumentQuery, QueryList};

    #[test]
    fn test_contents_search() {
        let query = GetContentsQuery {
            container: GetFromDocumentQuery {
                uuid: Some("urn:uuid:ss1".into()),
                unique_id: None,
            },
            format_codes: vec![Code::new("f1", "1.4")],
            confidentiality_codes: QueryList::new(vec![vec![Code::new("N", "2.16")]]),
        };
        let identifiers = token::urn_identifiers(query.container.identifiers());
        let search = contents_search(&query, &identifiers);

        assert_eq!(search.values("format"), vec!["urn:oid:1.4|f1"]);
        assert_eq!(search.values("security-label"), vec!["urn:oid:2.16|N"]);
        assert_eq!(
            search.values("_has:List:item:identifier"),
            vec!["urn:uuid:ss1"]
        );
    }
}
