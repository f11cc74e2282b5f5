use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xdsfhir_core::vocabulary::{DESIGNATION_TYPE_EXTENSION, SOURCE_ID_EXTENSION};

use super::{CodeableConcept, FhirResource, Identified, Identifier, Meta, Reference};
use crate::bundle::ReferenceResolver;

/// A `List` resource. Folders and submission sets are both lists and only
/// differ by profile and list type code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contained: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<ListEntry>,
}

impl ListResource {
    /// Values of the MHD `designationType` extensions.
    pub fn designation_types(&self) -> impl Iterator<Item = &CodeableConcept> {
        self.extension
            .iter()
            .filter(|ext| ext.url == DESIGNATION_TYPE_EXTENSION)
            .filter_map(|ext| ext.value_codeable_concept.as_ref())
    }

    /// Value of the MHD `sourceId` extension.
    pub fn source_id(&self) -> Option<&str> {
        self.extension
            .iter()
            .find(|ext| ext.url == SOURCE_ID_EXTENSION)
            .and_then(|ext| ext.value_identifier.as_ref())
            .and_then(|id| id.value.as_deref())
    }

    pub fn first_note(&self) -> Option<&str> {
        self.note.first().and_then(|note| note.text.as_deref())
    }
}

impl FhirResource for ListResource {
    const RESOURCE_TYPE: &'static str = "List";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn resolve_references(&mut self, resolver: &ReferenceResolver<'_>) {
        let contained = std::mem::take(&mut self.contained);
        let scope = resolver.scoped(&contained);
        for reference in self
            .subject
            .iter_mut()
            .chain(self.source.iter_mut())
            .chain(self.entry.iter_mut().map(|entry| &mut entry.item))
        {
            scope.resolve(reference);
        }
        self.contained = contained;
    }
}

impl Identified for ListResource {
    fn identifiers(&self) -> &[Identifier] {
        &self.identifier
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub item: Reference,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extension {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

macro_rules! mhd_list {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub ListResource);

        impl $name {
            pub fn into_inner(self) -> ListResource {
                self.0
            }
        }

        impl Deref for $name {
            type Target = ListResource;

            fn deref(&self) -> &ListResource {
                &self.0
            }
        }

        impl FhirResource for $name {
            const RESOURCE_TYPE: &'static str = ListResource::RESOURCE_TYPE;

            fn id(&self) -> Option<&str> {
                self.0.id()
            }

            fn resolve_references(&mut self, resolver: &ReferenceResolver<'_>) {
                self.0.resolve_references(resolver);
            }
        }

        impl Identified for $name {
            fn identifiers(&self) -> &[Identifier] {
                &self.0.identifier
            }
        }
    };
}

mhd_list!(
    /// A `List` searched with the MHD folder template.
    MhdFolder
);
mhd_list!(
    /// A `List` searched with the MHD submission set template.
    MhdSubmissionSet
);
