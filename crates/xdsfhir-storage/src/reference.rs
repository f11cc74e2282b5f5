//! Parsing of FHIR reference strings into resource identities.
//!
//! References found in backend resources come in several shapes:
//! - Relative: `DocumentReference/123`
//! - Versioned: `DocumentReference/123/_history/1`
//! - Absolute URL: `http://example.org/fhir/DocumentReference/123`
//! - Contained: `#author` (local to the referencing resource)
//! - URN: `urn:uuid:...` (only meaningful inside one bundle)
//!
//! Absolute URLs are reduced to their trailing `Type/id` part. Search pages
//! are returned by a single server, so the server base is irrelevant for
//! matching resources within one result set.

use std::fmt;

/// Identity of a backend resource: its type and logical id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FhirReference {
    /// The resource type (e.g., "DocumentReference", "List")
    pub resource_type: String,
    /// The resource ID
    pub id: String,
    /// Optional version ID from `_history` suffix
    pub version: Option<String>,
}

impl FhirReference {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            version: None,
        }
    }

    /// Returns the reference as a relative string (Type/id).
    pub fn to_relative(&self) -> String {
        format!("{}/{}", self.resource_type, self.id)
    }

    /// Same resource, ignoring the version.
    pub fn same_resource(&self, other: &FhirReference) -> bool {
        self.resource_type == other.resource_type && self.id == other.id
    }
}

impl fmt::Display for FhirReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_relative())
    }
}

/// A reference that does not name a `Type/id` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvableReference {
    /// A contained reference (starts with `#`)
    Contained(String),
    /// A URN reference (`urn:uuid:xxx` or `urn:oid:xxx`)
    Urn(String),
    /// A malformed or invalid reference
    Invalid(String),
}

impl fmt::Display for UnresolvableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained(id) => write!(f, "contained reference: #{id}"),
            Self::Urn(urn) => write!(f, "URN reference: {urn}"),
            Self::Invalid(reason) => write!(f, "invalid reference: {reason}"),
        }
    }
}

impl std::error::Error for UnresolvableReference {}

/// Parse a FHIR reference string into its resource identity.
///
/// # Examples
///
/// ```
/// use xdsfhir_storage::reference::{parse_reference, UnresolvableReference};
///
/// let r = parse_reference("http://localhost/fhir/List/42/_history/3").unwrap();
/// assert_eq!(r.resource_type, "List");
/// assert_eq!(r.id, "42");
/// assert_eq!(r.version.as_deref(), Some("3"));
///
/// let err = parse_reference("#author").unwrap_err();
/// assert_eq!(err, UnresolvableReference::Contained("author".to_string()));
/// ```
pub fn parse_reference(reference: &str) -> Result<FhirReference, UnresolvableReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UnresolvableReference::Invalid(
            "empty reference".to_string(),
        ));
    }

    if let Some(contained_id) = reference.strip_prefix('#') {
        return Err(UnresolvableReference::Contained(contained_id.to_string()));
    }

    if reference.starts_with("urn:") {
        return Err(UnresolvableReference::Urn(reference.to_string()));
    }

    let path = match reference.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => reference,
    };
    let path = path.split(['?', '#']).next().unwrap_or(path);

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let (resource_type, id, version) = match parts.iter().rposition(|p| *p == "_history") {
        Some(pos) if pos >= 2 => (parts[pos - 2], parts[pos - 1], parts.get(pos + 1).copied()),
        Some(_) => {
            return Err(UnresolvableReference::Invalid(format!(
                "history segment without Type/id: {reference}"
            )));
        }
        None if parts.len() >= 2 => (parts[parts.len() - 2], parts[parts.len() - 1], None),
        None => {
            return Err(UnresolvableReference::Invalid(format!(
                "reference must contain at least Type/id: {reference}"
            )));
        }
    };

    // Resource types start with an uppercase letter
    if !resource_type
        .chars()
        .next()
        .map(|c| c.is_ascii_uppercase())
        .unwrap_or(false)
    {
        return Err(UnresolvableReference::Invalid(format!(
            "resource type must start with uppercase letter: {resource_type}"
        )));
    }

    Ok(FhirReference {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
        version: version.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_relative_reference() {
        let r = parse_reference("DocumentReference/123").unwrap();
        assert_eq!(r.resource_type, "DocumentReference");
        assert_eq!(r.id, "123");
        assert!(r.version.is_none());
    }

    #[test]
    fn test_versioned_reference() {
        let r = parse_reference("List/abc/_history/2").unwrap();
        assert_eq!(r.to_relative(), "List/abc");
        assert_eq!(r.version, Some("2".to_string()));
    }

    #[test]
    fn test_absolute_url_reference() {
        let r = parse_reference("http://localhost:8080/fhir/DocumentReference/123").unwrap();
        assert_eq!(r, FhirReference::new("DocumentReference", "123"));
    }

    #[test]
    fn test_absolute_versioned_url_reference() {
        let r = parse_reference("https://example.org/fhir/Patient/p1/_history/7").unwrap();
        assert_eq!(r.to_relative(), "Patient/p1");
        assert_eq!(r.version.as_deref(), Some("7"));
    }

    #[test]
    fn test_same_resource_ignores_version() {
        let a = parse_reference("List/1/_history/1").unwrap();
        let b = parse_reference("http://server/List/1").unwrap();
        assert!(a.same_resource(&b));
        assert!(!a.same_resource(&FhirReference::new("DocumentReference", "1")));
    }

    #[test]
    fn test_contained_reference() {
        let err = parse_reference("#pract").unwrap_err();
        assert!(matches!(err, UnresolvableReference::Contained(ref id) if id == "pract"));
    }

    #[test]
    fn test_urn_reference() {
        let err = parse_reference("urn:uuid:53fefa32-fcbb-4ff8-8a92-55ee120877b7").unwrap_err();
        assert!(matches!(err, UnresolvableReference::Urn(_)));
    }

    #[test]
    fn test_invalid_references() {
        assert!(matches!(
            parse_reference("").unwrap_err(),
            UnresolvableReference::Invalid(_)
        ));
        assert!(matches!(
            parse_reference("patient/123").unwrap_err(),
            UnresolvableReference::Invalid(_)
        ));
        assert!(matches!(
            parse_reference("Patient").unwrap_err(),
            UnresolvableReference::Invalid(_)
        ));
        assert!(matches!(
            parse_reference("_history/1").unwrap_err(),
            UnresolvableReference::Invalid(_)
        ));
    }

    #[test]
    fn test_display() {
        let r = FhirReference::new("Organization", "org-1");
        assert_eq!(format!("{r}"), "Organization/org-1");
    }
}
