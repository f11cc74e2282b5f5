//! Stored query entry point.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;
use xdsfhir_core::{QueryRequest, QueryResponse};
use xdsfhir_mapping::RegistryMapper;
use xdsfhir_storage::DynBackend;

use crate::collector::ResponseCollector;
use crate::error::QueryError;
use crate::handlers::{QueryContext, dispatch};

/// Default cap on the number of objects in one response.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Objects beyond this count are cut off and the response is marked
    /// `PARTIAL_SUCCESS`.
    pub max_results: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Translates stored queries into backend searches and rebuilds registry
/// responses from the results.
///
/// Stateless across requests; one processor can serve concurrent queries.
#[derive(Clone)]
pub struct StoredQueryProcessor {
    backend: DynBackend,
    mapper: Arc<dyn RegistryMapper>,
    settings: QuerySettings,
}

impl StoredQueryProcessor {
    pub fn new(backend: DynBackend, mapper: Arc<dyn RegistryMapper>, settings: QuerySettings) -> Self {
        Self {
            backend,
            mapper,
            settings,
        }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Runs one stored query.
    ///
    /// # Errors
    ///
    /// - `QueryError::Unsupported` for query shapes outside the registry
    ///   profile
    /// - `QueryError::InvalidQuery` when a required parameter is missing
    /// - `QueryError::Backend` when a search or page fetch fails; nothing of
    ///   the partial result is returned in that case
    #[instrument(
        skip(self, request),
        fields(query = request.query.kind(), return_type = ?request.return_type)
    )]
    pub async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, QueryError> {
        let collector = ResponseCollector::new(self.settings.max_results, request.return_type);
        let mut ctx = QueryContext::new(self.backend.as_ref(), self.mapper.as_ref(), collector);

        if let Err(e) = dispatch(&mut ctx, &request.query).await {
            tracing::warn!(error = %e, "Stored query failed");
            return Err(e);
        }

        let response = ctx.finish();
        tracing::info!(
            status = %response.status,
            documents = response.document_entries.len(),
            folders = response.folders.len(),
            submission_sets = response.submission_sets.len(),
            associations = response.associations.len(),
            references = response.references.len(),
            backend = self.backend.backend_name(),
            "Stored query processed"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for StoredQueryProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredQueryProcessor")
            .field("backend", &self.backend.backend_name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
