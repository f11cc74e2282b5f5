//! People and organisations referenced by documents and lists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CodeableConcept, FhirResource, Identified, Identifier, Reference};
use crate::bundle::ReferenceResolver;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ContactPoint {
    pub fn is_email(&self) -> bool {
        self.system.as_deref() == Some("email")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Practitioner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An author in a role: the practitioner, the organisation and the role
/// and specialty codes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PractitionerRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contained: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specialty: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

macro_rules! plain_resource {
    ($ty:ident, $name:literal) => {
        impl FhirResource for $ty {
            const RESOURCE_TYPE: &'static str = $name;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }
        }

        impl Identified for $ty {
            fn identifiers(&self) -> &[Identifier] {
                &self.identifier
            }
        }
    };
}

plain_resource!(Patient, "Patient");
plain_resource!(Practitioner, "Practitioner");
plain_resource!(Organization, "Organization");

impl FhirResource for PractitionerRole {
    const RESOURCE_TYPE: &'static str = "PractitionerRole";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn resolve_references(&mut self, resolver: &ReferenceResolver<'_>) {
        let contained = std::mem::take(&mut self.contained);
        let scope = resolver.scoped(&contained);
        for reference in self
            .practitioner
            .iter_mut()
            .chain(self.organization.iter_mut())
        {
            scope.resolve(reference);
        }
        self.contained = contained;
    }
}
