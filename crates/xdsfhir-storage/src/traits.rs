//! The backend contract consumed by the query engine.

use async_trait::async_trait;

use crate::bundle::Bundle;
use crate::error::StorageError;
use crate::types::SearchParams;

/// A FHIR server the engine can search.
///
/// Implementations must be thread-safe (`Send + Sync`). Each call is a single
/// request that either yields a page or fails; retries belong to the
/// implementation's transport, not to the engine.
///
/// # Example
///
/// ```ignore
/// use xdsfhir_storage::{FhirBackend, SearchParams, StorageError};
///
/// async fn count_pages(backend: &dyn FhirBackend, params: &SearchParams) -> Result<usize, StorageError> {
///     let mut page = backend.search(params).await?;
///     let mut pages = 1;
///     while let Some(next) = page.next_link().map(str::to_owned) {
///         page = backend.load_page(&next).await?;
///         pages += 1;
///     }
///     Ok(pages)
/// }
/// ```
#[async_trait]
pub trait FhirBackend: Send + Sync {
    /// Runs a search and returns the first result page.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Http` when the server rejects the search and
    /// `StorageError::ConnectionError` when it cannot be reached.
    async fn search(&self, params: &SearchParams) -> Result<Bundle, StorageError>;

    /// Fetches the page behind a `next` link of a previous page.
    async fn load_page(&self, next_link: &str) -> Result<Bundle, StorageError>;

    /// Returns a short name for this backend, used in logs.
    fn backend_name(&self) -> &'static str;
}
