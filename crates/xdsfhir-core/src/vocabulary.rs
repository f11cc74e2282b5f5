//! Fixed vocabulary shared by the query and mapping layers.
//!
//! Covers the URN prefixes used to encode registry scheme names as backend
//! coding systems, the MHD profile and list-type constants, and the two
//! bidirectional tables between registry enums and backend codes:
//!
//! | Registry                    | Backend        |
//! |-----------------------------|----------------|
//! | `AvailabilityStatus::Approved`   | `current`     |
//! | `AvailabilityStatus::Deprecated` | `superseded`  |
//! | `AssociationType::Append`        | `appends`     |
//! | `AssociationType::Replace`       | `replaces`    |
//! | `AssociationType::Signs`         | `signs`       |
//! | `AssociationType::Transform`     | `transforms`  |

use crate::association::AssociationType;
use crate::id::{is_oid, is_urn, is_uuid};
use crate::metadata::AvailabilityStatus;

pub const OID_URN: &str = "urn:oid:";
pub const UUID_URN: &str = "urn:uuid:";
pub const XDS_URN: &str = "urn:ihe:xds:";
/// Identifier system for values that are themselves URIs.
pub const URI_URN: &str = "urn:ietf:rfc:3986";

pub const MHD_COMPREHENSIVE_PROFILE: &str =
    "https://profiles.ihe.net/ITI/MHD/StructureDefinition/IHE.MHD.Comprehensive.DocumentReference";
pub const MHD_COMPREHENSIVE_SUBMISSIONSET_PROFILE: &str =
    "https://profiles.ihe.net/ITI/MHD/StructureDefinition/IHE.MHD.Comprehensive.SubmissionSet";
pub const MHD_COMPREHENSIVE_FOLDER_PROFILE: &str =
    "https://profiles.ihe.net/ITI/MHD/StructureDefinition/IHE.MHD.Comprehensive.Folder";

pub const MHD_LIST_TYPES_SYSTEM: &str = "https://profiles.ihe.net/ITI/MHD/CodeSystem/MHDlistTypes";
pub const FOLDER_LIST_CODE: &str = "folder";
pub const SUBMISSIONSET_LIST_CODE: &str = "submissionset";

pub const DESIGNATION_TYPE_EXTENSION: &str =
    "https://profiles.ihe.net/ITI/MHD/StructureDefinition/ihe-designationType";
pub const SOURCE_ID_EXTENSION: &str =
    "https://profiles.ihe.net/ITI/MHD/StructureDefinition/ihe-sourceId";

const STATUS_TABLE: [(AvailabilityStatus, &str); 2] = [
    (AvailabilityStatus::Approved, "current"),
    (AvailabilityStatus::Deprecated, "superseded"),
];

const RELATIONSHIP_TABLE: [(AssociationType, &str); 4] = [
    (AssociationType::Append, "appends"),
    (AssociationType::Replace, "replaces"),
    (AssociationType::Signs, "signs"),
    (AssociationType::Transform, "transforms"),
];

/// Backend status code for a registry availability status, if one exists.
pub fn status_to_backend(status: AvailabilityStatus) -> Option<&'static str> {
    STATUS_TABLE
        .iter()
        .find(|(registry, _)| *registry == status)
        .map(|(_, code)| *code)
}

pub fn status_from_backend(code: &str) -> Option<AvailabilityStatus> {
    STATUS_TABLE
        .iter()
        .find(|(_, backend)| *backend == code)
        .map(|(registry, _)| *registry)
}

/// Backend `relatesTo.code` for a document-to-document association type.
pub fn relationship_to_backend(association_type: AssociationType) -> Option<&'static str> {
    RELATIONSHIP_TABLE
        .iter()
        .find(|(registry, _)| *registry == association_type)
        .map(|(_, code)| *code)
}

pub fn relationship_from_backend(code: &str) -> Option<AssociationType> {
    RELATIONSHIP_TABLE
        .iter()
        .find(|(_, backend)| *backend == code)
        .map(|(registry, _)| *registry)
}

/// Encode a registry scheme name or identifier as a URN.
///
/// Values that already are URNs pass through. OIDs get `urn:oid:`, UUIDs
/// get `urn:uuid:`, anything else is placed under `urn:ihe:xds:`.
pub fn to_urn_coded(value: &str) -> String {
    if is_urn(value) {
        value.to_string()
    } else if is_oid(value) {
        format!("{OID_URN}{value}")
    } else if is_uuid(value) {
        format!("{UUID_URN}{value}")
    } else {
        format!("{XDS_URN}{value}")
    }
}

/// Strip the URN prefixes added by [`to_urn_coded`].
pub fn urn_decoded_scheme(system: &str) -> String {
    [OID_URN, UUID_URN, XDS_URN]
        .iter()
        .find_map(|prefix| system.strip_prefix(prefix))
        .unwrap_or(system)
        .to_string()
}
