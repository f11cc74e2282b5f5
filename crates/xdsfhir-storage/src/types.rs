//! Search criteria sent to the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameters for one backend search.
///
/// Criteria are kept in insertion order. A key that appears several times is
/// AND-ed by the backend; comma separated values inside one criterion are
/// OR-ed. Adding a criterion never replaces an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Resource type searched, e.g. `DocumentReference`.
    pub resource_type: String,
    /// Search criteria as ordered key-value pairs.
    pub parameters: Vec<(String, String)>,
    /// Page size hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl SearchParams {
    /// Creates an empty search over `resource_type`.
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    /// Adds a search parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_param(key, value);
        self
    }

    /// Sets the count parameter.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Adds a search parameter in place.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.push((key.into(), value.into()));
    }

    /// All values given for `key`, in insertion order.
    #[must_use]
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns true if any criterion uses `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.parameters.iter().any(|(k, _)| k == key)
    }

    /// Query pairs as sent over the wire, `_count` included.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.parameters.clone();
        if let Some(count) = self.count {
            pairs.push(("_count".to_string(), count.to_string()));
        }
        pairs
    }

    /// Returns true if this search has no criteria.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?", self.resource_type)?;
        for (i, (key, value)) in self.query_pairs().iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_additive() {
        let params = SearchParams::new("DocumentReference")
            .with_param("event", "urn:ihe:xds:scheme7|code7,urn:ihe:xds:scheme8|code8")
            .with_param("event", "urn:ihe:xds:scheme9|code9")
            .with_param("status", "current");

        assert_eq!(params.values("event").len(), 2);
        assert_eq!(params.values("status"), vec!["current"]);
        assert!(params.contains("event"));
        assert!(!params.contains("date"));
    }

    #[test]
    fn test_display_and_count() {
        let params = SearchParams::new("List")
            .with_param("_include", "List:subject")
            .with_count(50);
        assert_eq!(params.to_string(), "List?_include=List:subject&_count=50");
        assert_eq!(params.query_pairs().len(), 2);
    }

    #[test]
    fn test_empty_params() {
        let params = SearchParams::new("Patient");
        assert!(params.is_empty());
        assert_eq!(params.to_string(), "Patient?");
    }
}
