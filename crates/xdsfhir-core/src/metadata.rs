//! Registry metadata objects returned by stored queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Version assigned to every object materialized by a query.
pub const DEFAULT_VERSION: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    #[default]
    Approved,
    Deprecated,
    Submitted,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "Approved"),
            Self::Deprecated => write!(f, "Deprecated"),
            Self::Submitted => write!(f, "Submitted"),
        }
    }
}

/// An identifier qualified by an assigning authority (HL7 CX).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifiable {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigning_authority: Option<String>,
}

impl Identifiable {
    pub fn new(id: impl Into<String>, assigning_authority: Option<String>) -> Self {
        Self {
            id: id.into(),
            assigning_authority,
        }
    }
}

impl fmt::Display for Identifiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.assigning_authority {
            Some(authority) => write!(f, "{}^^^&{authority}&ISO", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    pub code: String,
    pub scheme_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Code {
    pub fn new(code: impl Into<String>, scheme_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            scheme_name: scheme_name.into(),
            display_name: None,
        }
    }
}

/// Identifier of a related object (HL7 CXi) carried by a document entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceId {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigning_authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
}

impl ReferenceId {
    pub fn new(id: impl Into<String>, assigning_authority: Option<String>) -> Self {
        Self {
            id: id.into(),
            assigning_authority,
            id_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl PersonName {
    /// Space separated `FAMILY GIVEN` rendering.
    pub fn render_plain(&self) -> String {
        [&self.family_name, &self.given_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifiable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
}

impl Person {
    /// HL7 v2 XCN rendering: `id^family^given^^suffix^prefix^^^&authority&ISO`,
    /// with trailing empty components removed.
    pub fn render_xcn(&self) -> String {
        let name = self.name.clone().unwrap_or_default();
        let id = self.id.as_ref();
        let authority = id
            .and_then(|id| id.assigning_authority.as_deref())
            .map(|authority| format!("&{authority}&ISO"))
            .unwrap_or_default();
        let components = [
            id.map(|id| id.id.clone()).unwrap_or_default(),
            name.family_name.unwrap_or_default(),
            name.given_name.unwrap_or_default(),
            String::new(),
            name.suffix.unwrap_or_default(),
            name.prefix.unwrap_or_default(),
            String::new(),
            String::new(),
            authority,
        ];
        components.join("^").trim_end_matches('^').to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigning_authority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_person: Option<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author_institutions: Vec<Organization>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author_roles: Vec<Identifiable>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author_specialties: Vec<Identifiable>,
    /// E-mail addresses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author_telecoms: Vec<String>,
}

/// Common view over document entries, folders and submission sets.
pub trait MetadataObject {
    fn entry_uuid(&self) -> &str;

    fn patient_id(&self) -> &Identifiable;

    fn availability_status(&self) -> AvailabilityStatus;

    fn authors(&self) -> &[Author];

    fn set_version_info(&mut self, logical_uuid: String, version: String);

    /// `logicalUuid := entryUuid`, `version := "1"`.
    fn assign_default_versioning(&mut self) {
        let logical_uuid = self.entry_uuid().to_string();
        self.set_version_info(logical_uuid, DEFAULT_VERSION.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentEntry {
    pub entry_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub patient_id: Identifiable,
    pub availability_status: AvailabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_setting_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcare_facility_type_code: Option<Code>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub confidentiality_codes: Vec<Code>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_codes: Vec<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_start_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_stop_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_patient_id: Option<Identifiable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_authenticator: Option<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_ids: Vec<ReferenceId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Folder {
    pub entry_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub patient_id: Identifiable,
    pub availability_status: AvailabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub codes: Vec<Code>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionSet {
    pub entry_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub patient_id: Identifiable,
    pub availability_status: AvailabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type_code: Option<Code>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
}

macro_rules! impl_metadata_object {
    ($ty:ty, |$this:ident| $authors:expr) => {
        impl MetadataObject for $ty {
            fn entry_uuid(&self) -> &str {
                &self.entry_uuid
            }

            fn patient_id(&self) -> &Identifiable {
                &self.patient_id
            }

            fn availability_status(&self) -> AvailabilityStatus {
                self.availability_status
            }

            fn authors(&self) -> &[Author] {
                let $this = self;
                $authors
            }

            fn set_version_info(&mut self, logical_uuid: String, version: String) {
                self.logical_uuid = Some(logical_uuid);
                self.version = Some(version);
            }
        }
    };
}

impl_metadata_object!(DocumentEntry, |doc| &doc.authors);
impl_metadata_object!(SubmissionSet, |set| &set.authors);
impl_metadata_object!(Folder, |_folder| &[]);
