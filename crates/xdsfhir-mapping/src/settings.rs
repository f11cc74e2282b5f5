//! Repository settings consumed by the document mapper.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Placeholder for the document unique id inside an endpoint template.
pub const DOCUMENT_UNIQUE_ID_PLACEHOLDER: &str = "$documentUniqueId";

/// Repositories documents can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// repositoryUniqueId -> download URL template containing
    /// `$documentUniqueId`. Matched in insertion order.
    pub endpoints: IndexMap<String, String>,
    /// repositoryUniqueId reported when no endpoint matches an attachment URL
    pub unknown_repository_id: String,
    /// Hash reported for attachments that carry none
    pub default_hash: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            endpoints: IndexMap::new(),
            unknown_repository_id: "2.999.1.2.3".to_string(),
            default_hash: "0000000000000000000000000000000000000000".to_string(),
        }
    }
}

impl RepositorySettings {
    /// Download URL of a document in a known repository.
    pub fn url_from(&self, repository_unique_id: &str, unique_id: &str) -> Option<String> {
        self.endpoints
            .get(repository_unique_id)
            .map(|template| template.replace(DOCUMENT_UNIQUE_ID_PLACEHOLDER, unique_id))
    }
}

/// Endpoint templates compiled into URL matchers.
#[derive(Debug, Clone)]
pub(crate) struct RepositoryMatcher {
    patterns: Vec<(String, Regex)>,
    unknown_repository_id: String,
}

impl RepositoryMatcher {
    pub(crate) fn compile(settings: &RepositorySettings) -> Result<Self, MappingError> {
        let patterns = settings
            .endpoints
            .iter()
            .map(|(repository, template)| {
                let pattern = template
                    .split(DOCUMENT_UNIQUE_ID_PLACEHOLDER)
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(".*");
                Regex::new(&format!("^{pattern}$"))
                    .map(|regex| (repository.clone(), regex))
                    .map_err(|e| MappingError::InvalidEndpoint {
                        repository: repository.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            patterns,
            unknown_repository_id: settings.unknown_repository_id.clone(),
        })
    }

    /// repositoryUniqueId of the first endpoint whose template matches `url`.
    pub(crate) fn repository_from_url(&self, url: &str) -> &str {
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(url))
            .map(|(repository, _)| repository.as_str())
            .unwrap_or(&self.unknown_repository_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RepositorySettings {
        let mut endpoints = IndexMap::new();
        endpoints.insert(
            "1.2.3.4".to_string(),
            "http://repo.example.org/xds/documents?uniqueId=$documentUniqueId".to_string(),
        );
        endpoints.insert(
            "1.2.3.5".to_string(),
            "http://other.example.org/$documentUniqueId/content".to_string(),
        );
        RepositorySettings {
            endpoints,
            ..Default::default()
        }
    }

    #[test]
    fn test_repository_from_url() {
        let matcher = RepositoryMatcher::compile(&settings()).unwrap();
        assert_eq!(
            matcher.repository_from_url("http://repo.example.org/xds/documents?uniqueId=1.2.3"),
            "1.2.3.4"
        );
        assert_eq!(
            matcher.repository_from_url("http://other.example.org/9.8/content"),
            "1.2.3.5"
        );
        assert_eq!(
            matcher.repository_from_url("http://unknown.example.org/doc"),
            "2.999.1.2.3"
        );
    }

    #[test]
    fn test_template_text_is_literal() {
        let matcher = RepositoryMatcher::compile(&settings()).unwrap();
        // '.' and '?' in the template must not act as regex operators
        assert_eq!(
            matcher.repository_from_url("http://repoXexample.org/xds/documentsXuniqueId=1"),
            "2.999.1.2.3"
        );
    }

    #[test]
    fn test_url_from() {
        let settings = settings();
        assert_eq!(
            settings.url_from("1.2.3.5", "1.9").as_deref(),
            Some("http://other.example.org/1.9/content")
        );
        assert!(settings.url_from("6.6.6", "1.9").is_none());
    }
}
