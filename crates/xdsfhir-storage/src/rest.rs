//! HTTP implementation of the backend contract.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::bundle::Bundle;
use crate::error::StorageError;
use crate::traits::FhirBackend;
use crate::types::SearchParams;

/// A FHIR REST server reached over HTTP.
#[derive(Debug, Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl RestBackend {
    /// Creates a backend for the server at `base_url` (e.g.
    /// `http://localhost:8080/fhir`).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSearch` for a base URL that cannot carry
    /// a path and `StorageError::Internal` when the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StorageError::invalid_search(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::invalid_search(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn search_url(&self, resource_type: &str) -> Result<Url, StorageError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::invalid_search("base URL cannot carry a path"))?
            .pop_if_empty()
            .push(resource_type);
        Ok(url)
    }

    fn page_url(&self, next_link: &str) -> Result<Url, StorageError> {
        match Url::parse(next_link) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(next_link)
                .map_err(|e| StorageError::invalid_search(format!("invalid next link {next_link}: {e}"))),
            Err(e) => Err(StorageError::invalid_search(format!(
                "invalid next link {next_link}: {e}"
            ))),
        }
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<Bundle, StorageError> {
        let response = request
            .header("Accept", "application/fhir+json")
            .send()
            .await?;
        handle_response(response).await
    }
}

#[async_trait]
impl FhirBackend for RestBackend {
    async fn search(&self, params: &SearchParams) -> Result<Bundle, StorageError> {
        if params.resource_type.is_empty() {
            return Err(StorageError::invalid_search("no resource type"));
        }
        let url = self.search_url(&params.resource_type)?;
        tracing::debug!(search = %params, "Searching backend");
        self.fetch(self.http.get(url).query(&params.query_pairs()))
            .await
    }

    async fn load_page(&self, next_link: &str) -> Result<Bundle, StorageError> {
        let url = self.page_url(next_link)?;
        tracing::debug!(url = %url, "Loading next result page");
        self.fetch(self.http.get(url)).await
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}

async fn handle_response(response: reqwest::Response) -> Result<Bundle, StorageError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        if let Ok(json) = serde_json::from_str::<Value>(&body)
            && json.get("resourceType").and_then(|v| v.as_str()) == Some("OperationOutcome")
            && let Some(issues) = json.get("issue").and_then(|v| v.as_array())
        {
            let msgs: Vec<&str> = issues
                .iter()
                .filter_map(|i| i.get("diagnostics").and_then(|d| d.as_str()))
                .collect();
            if !msgs.is_empty() {
                return Err(StorageError::http(status.as_u16(), msgs.join("; ")));
            }
        }
        return Err(StorageError::http(status.as_u16(), body));
    }

    let json: Value = serde_json::from_str(&body)
        .map_err(|e| StorageError::invalid_bundle(format!("response is not JSON: {e}")))?;
    match json.get("resourceType").and_then(Value::as_str) {
        Some("Bundle") => serde_json::from_value(json)
            .map_err(|e| StorageError::invalid_bundle(e.to_string())),
        other => Err(StorageError::invalid_bundle(format!(
            "expected a Bundle, got {}",
            other.unwrap_or("no resourceType")
        ))),
    }
}
