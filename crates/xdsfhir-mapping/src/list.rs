use time::OffsetDateTime;
use xdsfhir_core::vocabulary::{status_from_backend, urn_decoded_scheme};
use xdsfhir_core::{AvailabilityStatus, Folder, Identifiable, Precision, SubmissionSet, Timestamp};
use xdsfhir_storage::{Identified, IdentifierUse, ListResource};

use crate::support::{author_from, code_from_concept, code_list, index_patient_id, timestamp_from};

/// Fields folders and submission sets share.
struct ListBase {
    entry_uuid: String,
    unique_id: Option<String>,
    patient_id: Identifiable,
    availability_status: AvailabilityStatus,
    title: Option<String>,
    comments: Option<String>,
}

fn list_base(list: &ListResource, kind: &str) -> Option<ListBase> {
    let Some(entry_uuid) = list.entry_uuid() else {
        tracing::debug!(id = ?list.id, kind, "List without identifier skipped");
        return None;
    };
    let Some(patient_id) = index_patient_id(list.subject.as_ref()) else {
        tracing::debug!(id = ?list.id, kind, "List without patient identifier skipped");
        return None;
    };
    Some(ListBase {
        entry_uuid: entry_uuid.to_string(),
        unique_id: list
            .identifier_with_use(IdentifierUse::Usual)
            .map(urn_decoded_scheme),
        patient_id,
        availability_status: list
            .status
            .as_deref()
            .and_then(status_from_backend)
            .unwrap_or(AvailabilityStatus::Deprecated),
        title: list.title.clone(),
        comments: list.first_note().map(str::to_string),
    })
}

pub(crate) fn map_folder(list: &ListResource) -> Option<Folder> {
    let base = list_base(list, "folder")?;
    let codes = list.designation_types().cloned().collect::<Vec<_>>();
    Some(Folder {
        entry_uuid: base.entry_uuid,
        unique_id: base.unique_id,
        patient_id: base.patient_id,
        availability_status: base.availability_status,
        logical_uuid: None,
        version: None,
        title: base.title,
        comments: base.comments,
        last_update_time: timestamp_from(list.date.as_deref())
            .or_else(|| Some(Timestamp::new(OffsetDateTime::now_utc(), Precision::Second))),
        codes: code_list(&codes),
    })
}

pub(crate) fn map_submission_set(list: &ListResource) -> Option<SubmissionSet> {
    let base = list_base(list, "submission set")?;
    Some(SubmissionSet {
        entry_uuid: base.entry_uuid,
        unique_id: base.unique_id,
        patient_id: base.patient_id,
        availability_status: base.availability_status,
        logical_uuid: None,
        version: None,
        title: base.title,
        comments: base.comments,
        source_id: list.source_id().map(urn_decoded_scheme),
        submission_time: timestamp_from(list.date.as_deref()),
        content_type_code: list.designation_types().next().and_then(code_from_concept),
        authors: list.source.iter().filter_map(author_from).collect(),
    })
}
