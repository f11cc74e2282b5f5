//! Conversions shared by the document and list mappers.

use xdsfhir_core::vocabulary::urn_decoded_scheme;
use xdsfhir_core::{Author, Code, Identifiable, Organization, Person, PersonName, Timestamp};
use xdsfhir_storage::{
    CodeableConcept, Coding, HumanName, Identifier, IdentifierUse, Practitioner, Reference,
    ResolvedResource,
};

/// The official identifier, else the first one, with the system decoded
/// into an assigning authority.
pub(crate) fn best_qualified<'a>(
    identifiers: impl IntoIterator<Item = &'a Identifier>,
) -> Option<Identifiable> {
    let identifiers: Vec<&Identifier> = identifiers.into_iter().collect();
    let best = identifiers
        .iter()
        .find(|id| id.use_ == Some(IdentifierUse::Official))
        .or_else(|| identifiers.first())?;
    let value = best.value.as_deref()?;
    Some(Identifiable::new(
        value,
        best.system.as_deref().map(urn_decoded_scheme),
    ))
}

/// Patient id from the resolved subject's identifiers and the subject's
/// logical identifier.
pub(crate) fn index_patient_id(subject: Option<&Reference>) -> Option<Identifiable> {
    let subject = subject?;
    let from_patient = subject
        .resolved()
        .and_then(ResolvedResource::as_patient)
        .map(|patient| patient.identifier.as_slice())
        .unwrap_or_default();
    best_qualified(from_patient.iter().chain(subject.identifier.as_ref()))
}

pub(crate) fn code_from(coding: &Coding) -> Option<Code> {
    let code = coding.code.as_deref()?;
    Some(Code {
        code: code.to_string(),
        scheme_name: coding
            .system
            .as_deref()
            .map(urn_decoded_scheme)
            .unwrap_or_default(),
        display_name: coding.display.clone(),
    })
}

pub(crate) fn code_from_concept(concept: &CodeableConcept) -> Option<Code> {
    concept.first_coding().and_then(code_from)
}

pub(crate) fn code_list(concepts: &[CodeableConcept]) -> Vec<Code> {
    concepts.iter().filter_map(code_from_concept).collect()
}

/// Registry timestamp from a backend date, dateTime or instant. Unparseable
/// values are dropped.
pub(crate) fn timestamp_from(value: Option<&str>) -> Option<Timestamp> {
    let value = value?;
    match Timestamp::from_backend(value) {
        Ok(timestamp) => Some(timestamp),
        Err(err) => {
            tracing::debug!(value, error = %err, "Ignoring unparseable date");
            None
        }
    }
}

pub(crate) fn person_name(name: &HumanName) -> PersonName {
    let joined = |parts: &[String]| (!parts.is_empty()).then(|| parts.join(" "));
    PersonName {
        family_name: name.family.clone(),
        given_name: joined(&name.given),
        prefix: joined(&name.prefix),
        suffix: joined(&name.suffix),
    }
}

pub(crate) fn person_from(practitioner: &Practitioner) -> Person {
    Person {
        id: best_qualified(&practitioner.identifier),
        name: Some(practitioner.name.first().map(person_name).unwrap_or_default()),
    }
}

/// The practitioner behind an author or authenticator reference, directly
/// or through a practitioner role.
pub(crate) fn practitioner_of(reference: &Reference) -> Option<&Practitioner> {
    match reference.resolved()? {
        ResolvedResource::Practitioner(practitioner) => Some(practitioner),
        ResolvedResource::PractitionerRole(role) => match role.practitioner.as_ref()?.resolved()? {
            ResolvedResource::Practitioner(practitioner) => Some(practitioner),
            _ => None,
        },
        _ => None,
    }
}

/// Author from a (resolved) `Practitioner` or `PractitionerRole` reference.
/// Unresolved references give no author.
pub(crate) fn author_from(reference: &Reference) -> Option<Author> {
    let mut author = Author::default();
    match reference.resolved()? {
        ResolvedResource::PractitionerRole(role) => {
            author.author_roles = role.code.iter().filter_map(identifiable_from_concept).collect();
            author.author_specialties = role
                .specialty
                .iter()
                .filter_map(identifiable_from_concept)
                .collect();
            if let Some(ResolvedResource::Organization(org)) = role
                .organization
                .as_ref()
                .and_then(Reference::resolved)
            {
                author.author_institutions.push(organization_from(org));
            }
        }
        ResolvedResource::Practitioner(_) => {}
        _ => return None,
    }
    if let Some(practitioner) = practitioner_of(reference) {
        author.author_person = Some(person_from(practitioner));
        author.author_telecoms = practitioner
            .telecom
            .iter()
            .filter(|contact| contact.is_email())
            .filter_map(|contact| contact.value.clone())
            .collect();
    }
    Some(author)
}

fn organization_from(org: &xdsfhir_storage::Organization) -> Organization {
    let first = org.identifier.first();
    Organization {
        organization_name: org.name.clone(),
        id_number: first.and_then(|id| id.value.clone()),
        assigning_authority: first
            .and_then(|id| id.system.as_deref())
            .map(urn_decoded_scheme),
    }
}

fn identifiable_from_concept(concept: &CodeableConcept) -> Option<Identifiable> {
    let coding = concept.first_coding()?;
    Some(Identifiable::new(
        coding.code.clone()?,
        coding.system.as_deref().map(urn_decoded_scheme),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdsfhir_core::Precision;

    #[test]
    fn test_best_qualified_decodes_authority() {
        let ids = [
            Identifier::new(Some("urn:oid:1.2"), "first"),
            Identifier::new(Some("urn:oid:1.3"), "id3").with_use(IdentifierUse::Official),
        ];
        assert_eq!(
            best_qualified(&ids),
            Some(Identifiable::new("id3", Some("1.3".into())))
        );
        assert_eq!(best_qualified(&ids[..1]).unwrap().id, "first");
        assert_eq!(best_qualified(Vec::<Identifier>::new().iter()), None);
    }

    #[test]
    fn test_index_patient_id_from_logical_identifier() {
        let subject = Reference {
            identifier: Some(Identifier::new(Some("urn:oid:1.3"), "id3")),
            ..Default::default()
        };
        assert_eq!(
            index_patient_id(Some(&subject)),
            Some(Identifiable::new("id3", Some("1.3".into())))
        );
        assert_eq!(index_patient_id(Some(&Reference::to("Patient/p1"))), None);
        assert_eq!(index_patient_id(None), None);
    }

    #[test]
    fn test_code_from_decodes_scheme() {
        let coding = Coding {
            system: Some("urn:ihe:xds:scheme1".into()),
            code: Some("code1".into()),
            display: Some("Code 1".into()),
        };
        let code = code_from(&coding).unwrap();
        assert_eq!(code.scheme_name, "scheme1");
        assert_eq!(code.display_name.as_deref(), Some("Code 1"));
        assert!(code_from(&Coding::default()).is_none());
    }

    #[test]
    fn test_timestamp_keeps_precision() {
        let ts = timestamp_from(Some("2021-04")).unwrap();
        assert_eq!(ts.precision(), Precision::Month);
        assert!(timestamp_from(Some("yesterday")).is_none());
    }

    #[test]
    fn test_person_name_joins_parts() {
        let name = HumanName {
            family: Some("Smith".into()),
            given: vec!["John".into(), "Paul".into()],
            prefix: vec![],
            suffix: vec!["Jr.".into()],
        };
        let person_name = person_name(&name);
        assert_eq!(person_name.given_name.as_deref(), Some("John Paul"));
        assert_eq!(person_name.prefix, None);
        assert_eq!(person_name.render_plain(), "Smith John Paul");
    }
}
