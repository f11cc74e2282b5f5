//! Typed views over the backend resources the engine reads.
//!
//! Only the elements used by the query engine and the MHD mappers are
//! modelled; everything else in the JSON is ignored on decode.

mod document;
mod list;
mod party;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bundle::ReferenceResolver;
use crate::reference::{FhirReference, parse_reference};

pub use document::{
    Attachment, DocumentReference, DocumentReferenceContent, DocumentReferenceContext, RelatesTo,
};
pub use list::{Annotation, Extension, ListEntry, ListResource, MhdFolder, MhdSubmissionSet};
pub use party::{ContactPoint, HumanName, Organization, Patient, Practitioner, PractitionerRole};

/// A resource kind that can be extracted from a result page.
pub trait FhirResource: DeserializeOwned + Send + Sync {
    /// The `resourceType` this view decodes.
    const RESOURCE_TYPE: &'static str;

    /// Logical id, when the server assigned one.
    fn id(&self) -> Option<&str>;

    /// Fill `Reference::resource` for the references this resource carries.
    fn resolve_references(&mut self, _resolver: &ReferenceResolver<'_>) {}

    /// Identity as a `Type/id` reference.
    fn key(&self) -> Option<FhirReference> {
        self.id()
            .map(|id| FhirReference::new(Self::RESOURCE_TYPE, id))
    }

    /// Whether `reference` points at this resource.
    fn is_target_of(&self, reference: &Reference) -> bool {
        match (self.key(), reference.target()) {
            (Some(key), Some(target)) => key.same_resource(&target),
            _ => false,
        }
    }
}

/// Resources carrying business identifiers.
pub trait Identified {
    fn identifiers(&self) -> &[Identifier];

    /// Registry entry UUID: the official identifier, else the first one.
    fn entry_uuid(&self) -> Option<&str> {
        let identifiers = self.identifiers();
        identifiers
            .iter()
            .find(|id| id.use_ == Some(IdentifierUse::Official))
            .or_else(|| identifiers.first())
            .and_then(|id| id.value.as_deref())
    }

    /// Value of the first identifier with the given use.
    fn identifier_with_use(&self, use_: IdentifierUse) -> Option<&str> {
        self.identifiers()
            .iter()
            .find(|id| id.use_ == Some(use_))
            .and_then(|id| id.value.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierUse {
    Usual,
    Official,
    Temp,
    Secondary,
    Old,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<IdentifierUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    pub fn new(system: Option<&str>, value: impl Into<String>) -> Self {
        Self {
            use_: None,
            system: system.map(str::to_string),
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub fn with_use(mut self, use_: IdentifierUse) -> Self {
        self.use_ = Some(use_);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn first_coding(&self) -> Option<&Coding> {
        self.coding.first()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
}

/// A reference to another resource, by literal reference and / or by
/// business identifier.
///
/// `resource` is never read from JSON. It is filled from contained and
/// included resources when a page is unmarshalled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip)]
    pub resource: Option<Box<ResolvedResource>>,
}

impl Reference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn has_reference(&self) -> bool {
        self.reference.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// Resource identity named by the literal reference, if any.
    pub fn target(&self) -> Option<FhirReference> {
        self.reference
            .as_deref()
            .and_then(|r| parse_reference(r).ok())
    }

    pub fn resolved(&self) -> Option<&ResolvedResource> {
        self.resource.as_deref()
    }
}

/// A resource a [`Reference`] was resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedResource {
    Patient(Patient),
    Practitioner(Practitioner),
    PractitionerRole(PractitionerRole),
    Organization(Organization),
    DocumentReference(Box<DocumentReference>),
    List(Box<ListResource>),
    Other(Value),
}

impl ResolvedResource {
    /// Decode a raw resource. Practitioner roles get their own references
    /// resolved against the same scope; other kinds are taken as they are.
    pub(crate) fn decode(value: &Value, resolver: &ReferenceResolver<'_>) -> Self {
        let resource_type = value.get("resourceType").and_then(Value::as_str);
        let decoded = match resource_type {
            Some(Patient::RESOURCE_TYPE) => decode_as(value).map(Self::Patient),
            Some(Practitioner::RESOURCE_TYPE) => decode_as(value).map(Self::Practitioner),
            Some(Organization::RESOURCE_TYPE) => decode_as(value).map(Self::Organization),
            Some(PractitionerRole::RESOURCE_TYPE) => {
                decode_as::<PractitionerRole>(value).map(|mut role| {
                    role.resolve_references(resolver);
                    Self::PractitionerRole(role)
                })
            }
            Some(DocumentReference::RESOURCE_TYPE) => {
                decode_as(value).map(|doc| Self::DocumentReference(Box::new(doc)))
            }
            Some(ListResource::RESOURCE_TYPE) => {
                decode_as(value).map(|list| Self::List(Box::new(list)))
            }
            _ => None,
        };
        decoded.unwrap_or_else(|| Self::Other(value.clone()))
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            Self::Patient(patient) => Some(patient),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentReference> {
        match self {
            Self::DocumentReference(doc) => Some(doc),
            _ => None,
        }
    }

    /// Registry entry UUID of a resolved document or list.
    pub fn entry_uuid(&self) -> Option<&str> {
        match self {
            Self::DocumentReference(doc) => doc.entry_uuid(),
            Self::List(list) => list.entry_uuid(),
            _ => None,
        }
    }
}

fn decode_as<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::debug!(error = %err, "Referenced resource could not be decoded");
            None
        }
    }
}
