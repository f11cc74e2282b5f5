use xdsfhir_core::vocabulary::{status_from_backend, urn_decoded_scheme};
use xdsfhir_core::{AvailabilityStatus, DocumentEntry, ReferenceId};
use xdsfhir_storage::{DocumentReference, Identified};

use crate::settings::RepositoryMatcher;
use crate::support::{
    author_from, code_from, code_from_concept, code_list, index_patient_id,
    person_from, practitioner_of, timestamp_from,
};

pub(crate) fn map_document(
    doc: &DocumentReference,
    repositories: &RepositoryMatcher,
    default_hash: &str,
) -> Option<DocumentEntry> {
    let Some(entry_uuid) = doc.entry_uuid() else {
        tracing::debug!(id = ?doc.id, "DocumentReference without identifier skipped");
        return None;
    };
    let Some(patient_id) = index_patient_id(doc.subject.as_ref()) else {
        tracing::debug!(id = ?doc.id, "DocumentReference without patient identifier skipped");
        return None;
    };

    let attachment = doc.attachment().cloned().unwrap_or_default();
    let context = doc.context.clone().unwrap_or_default();

    let source_patient_id = context
        .source_patient_info
        .as_ref()
        .and_then(|info| index_patient_id(Some(info)))
        .unwrap_or_else(|| patient_id.clone());

    let reference_ids = context
        .related
        .iter()
        .filter_map(|related| {
            let identifier = related.identifier.as_ref()?;
            Some(ReferenceId {
                id: identifier.value.clone()?,
                assigning_authority: identifier.system.as_deref().map(urn_decoded_scheme),
                id_type: related.type_.clone(),
            })
        })
        .collect();

    let period = context.period.clone().unwrap_or_default();

    Some(DocumentEntry {
        entry_uuid: entry_uuid.to_string(),
        unique_id: doc
            .master_identifier
            .as_ref()
            .and_then(|id| id.value.as_deref())
            .map(urn_decoded_scheme),
        patient_id,
        availability_status: doc
            .status
            .as_deref()
            .and_then(status_from_backend)
            .unwrap_or(AvailabilityStatus::Deprecated),
        logical_uuid: None,
        version: None,
        title: attachment.title.clone(),
        comments: doc.description.clone(),
        class_code: doc.category.first().and_then(code_from_concept),
        type_code: doc.type_.as_ref().and_then(code_from_concept),
        format_code: doc.format().and_then(code_from),
        practice_setting_code: context.practice_setting.as_ref().and_then(code_from_concept),
        healthcare_facility_type_code: context.facility_type.as_ref().and_then(code_from_concept),
        confidentiality_codes: code_list(&doc.security_label),
        event_codes: code_list(&context.event),
        mime_type: attachment.content_type.clone(),
        size: attachment.size,
        hash: Some(
            attachment
                .hash
                .clone()
                .unwrap_or_else(|| default_hash.to_string()),
        ),
        language_code: attachment.language.clone(),
        creation_time: timestamp_from(attachment.creation.as_deref().or(doc.date.as_deref())),
        service_start_time: timestamp_from(period.start.as_deref()),
        service_stop_time: timestamp_from(period.end.as_deref()),
        source_patient_id: Some(source_patient_id),
        repository_unique_id: attachment
            .url
            .as_deref()
            .map(|url| repositories.repository_from_url(url).to_string()),
        legal_authenticator: doc
            .authenticator
            .as_ref()
            .and_then(practitioner_of)
            .map(person_from),
        reference_ids,
        authors: doc.author.iter().filter_map(author_from).collect(),
    })
}
