//! Token criteria: codes, statuses, identifiers.
//!
//! Values inside one criterion are comma separated and OR-ed by the backend.
//! Every function only appends; a predicate with nothing to search for emits
//! no criterion at all.

use xdsfhir_core::vocabulary::{OID_URN, URI_URN, status_to_backend, to_urn_coded};
use xdsfhir_core::{AvailabilityStatus, Code, Identifiable, QueryList, ReferenceId};
use xdsfhir_storage::SearchParams;

use crate::parameters::{PATIENT_IDENTIFIER, RELATED_IDENTIFIER, SOURCE_ID, STATUS};

/// `system|code` with the scheme name coded as a URN.
pub fn code_token(code: &Code) -> String {
    if code.scheme_name.is_empty() {
        code.code.clone()
    } else {
        format!("{}|{}", to_urn_coded(&code.scheme_name), code.code)
    }
}

/// One criterion OR-ing all codes.
pub fn codes(params: &mut SearchParams, name: &str, codes: &[Code]) {
    if codes.is_empty() {
        return;
    }
    let value = codes.iter().map(code_token).collect::<Vec<_>>().join(",");
    params.add_param(name, value);
}

/// One criterion per inner list; the criteria are AND-ed.
pub fn code_list(params: &mut SearchParams, name: &str, list: &QueryList<Code>) {
    for group in &list.outer {
        codes(params, name, group);
    }
}

/// Statuses mapped through the status table. Unmapped statuses are dropped,
/// and no criterion is emitted when none map.
pub fn status(params: &mut SearchParams, statuses: &[AvailabilityStatus]) {
    let mut mapped: Vec<&str> = Vec::new();
    for code in statuses.iter().copied().filter_map(status_to_backend) {
        if !mapped.contains(&code) {
            mapped.push(code);
        }
    }
    if !mapped.is_empty() {
        params.add_param(STATUS, mapped.join(","));
    }
}

/// `patient.identifier=urn:oid:<authority>|<id>`.
pub fn patient(params: &mut SearchParams, patient_id: &Identifiable) {
    if patient_id.id.is_empty() {
        return;
    }
    let value = match patient_id.assigning_authority.as_deref() {
        Some(authority) => format!("{OID_URN}{authority}|{}", patient_id.id),
        None => patient_id.id.clone(),
    };
    params.add_param(PATIENT_IDENTIFIER, value);
}

/// URN coded identifier values, without a system.
pub fn urn_identifiers<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values.into_iter().map(to_urn_coded).collect()
}

/// `<name>=urn:ietf:rfc:3986|v1,urn:ietf:rfc:3986|v2`, values taken as given.
pub fn uri_identifiers<S: AsRef<str>>(params: &mut SearchParams, name: &str, values: &[S]) {
    if values.is_empty() {
        return;
    }
    let value = values
        .iter()
        .map(|v| format!("{URI_URN}|{}", v.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    params.add_param(name, value);
}

/// Search token of a reference id: `urn:oid:<authority>|<id>`, or the bare
/// id without an authority.
pub fn reference_id_token(reference_id: &ReferenceId) -> String {
    match reference_id.assigning_authority.as_deref() {
        Some(authority) => format!("{OID_URN}{authority}|{}", reference_id.id),
        None => reference_id.id.clone(),
    }
}

/// All reference ids of all groups in one `related:identifier` criterion.
pub fn reference_ids(params: &mut SearchParams, reference_ids: &QueryList<ReferenceId>) {
    let tokens: Vec<String> = reference_ids
        .outer
        .iter()
        .flatten()
        .map(reference_id_token)
        .collect();
    if !tokens.is_empty() {
        params.add_param(RELATED_IDENTIFIER, tokens.join(","));
    }
}

pub fn source_ids(params: &mut SearchParams, source_ids: &[String]) {
    if !source_ids.is_empty() {
        params.add_param(SOURCE_ID, source_ids.join(","));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(code: &str, scheme: &str) -> Code {
        Code::new(code, scheme)
    }

    #[test]
    fn test_code_tokens_are_urn_coded() {
        assert_eq!(
            code_token(&code("code1", "scheme1")),
            "urn:ihe:xds:scheme1|code1"
        );
        assert_eq!(
            code_token(&code("34133-9", "2.16.840.1.113883.6.1")),
            "urn:oid:2.16.840.1.113883.6.1|34133-9"
        );
        assert_eq!(
            code_token(&code("N", "urn:oid:2.16.840.1.113883.5.25")),
            "urn:oid:2.16.840.1.113883.5.25|N"
        );
    }

    #[test]
    fn test_code_list_emits_one_criterion_per_group() {
        let mut params = SearchParams::new("DocumentReference");
        let list = QueryList::new(vec![
            vec![code("code7", "scheme7"), code("code8", "scheme8")],
            vec![],
            vec![code("code9", "scheme9")],
        ]);
        code_list(&mut params, "event", &list);

        assert_eq!(
            params.values("event"),
            vec![
                "urn:ihe:xds:scheme7|code7,urn:ihe:xds:scheme8|code8",
                "urn:ihe:xds:scheme9|code9"
            ]
        );
    }

    #[test]
    fn test_status_drops_unmapped_values() {
        let mut params = SearchParams::new("DocumentReference");
        status(
            &mut params,
            &[
                AvailabilityStatus::Approved,
                AvailabilityStatus::Submitted,
                AvailabilityStatus::Deprecated,
            ],
        );
        assert_eq!(params.values("status"), vec!["current,superseded"]);

        let mut params = SearchParams::new("DocumentReference");
        status(&mut params, &[AvailabilityStatus::Submitted]);
        assert!(!params.contains("status"));
    }

    #[test]
    fn test_patient_is_a_chained_identifier() {
        let mut params = SearchParams::new("List");
        patient(&mut params, &Identifiable::new("id3", Some("1.3".into())));
        assert_eq!(
            params.values("patient.identifier"),
            vec!["urn:oid:1.3|id3"]
        );
    }

    #[test]
    fn test_identifier_lists() {
        let values = urn_identifiers(["1.2.3", "urn:uuid:abc"]);
        assert_eq!(values, vec!["urn:oid:1.2.3", "urn:uuid:abc"]);

        let mut params = SearchParams::new("DocumentReference");
        uri_identifiers(&mut params, "identifier", &values);
        assert_eq!(
            params.values("identifier"),
            vec!["urn:ietf:rfc:3986|urn:oid:1.2.3,urn:ietf:rfc:3986|urn:uuid:abc"]
        );

        uri_identifiers::<String>(&mut params, "identifier", &[]);
        assert_eq!(params.values("identifier").len(), 1);
    }

    #[test]
    fn test_reference_ids_flatten_groups() {
        let mut params = SearchParams::new("DocumentReference");
        let list = QueryList::new(vec![
            vec![ReferenceId::new("ref1", Some("1.2.3".into()))],
            vec![ReferenceId::new("ref2", None)],
        ]);
        reference_ids(&mut params, &list);
        assert_eq!(
            params.values("related:identifier"),
            vec!["urn:oid:1.2.3|ref1,ref2"]
        );

        let mut params = SearchParams::new("DocumentReference");
        reference_ids(&mut params, &QueryList::default());
        assert!(params.is_empty());
    }

    #[test]
    fn test_source_ids() {
        let mut params = SearchParams::new("List");
        source_ids(&mut params, &["1.2.3".into(), "4.5.6".into()]);
        assert_eq!(params.values("sourceId"), vec!["1.2.3,4.5.6"]);
    }
}
