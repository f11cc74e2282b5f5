//! # xdsfhir-query
//!
//! Stored query engine of a registry whose metadata lives in a FHIR server.
//!
//! A [`StoredQueryProcessor`] takes a [`QueryRequest`], runs the backend
//! searches its query shape needs, walks the paged results lazily, maps each
//! candidate through a [`RegistryMapper`] and rebuilds the associations the
//! backend does not store. Responses are capped at
//! [`QuerySettings::max_results`] objects.
//!
//! ```no_run
//! use std::sync::Arc;
//! use xdsfhir_core::{GetByIdQuery, QueryRequest, QueryReturnType, StoredQuery};
//! use xdsfhir_mapping::{MhdMapper, RepositorySettings};
//! use xdsfhir_query::{QuerySettings, StoredQueryProcessor};
//! use xdsfhir_storage::RestBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RestBackend::new("http://localhost:8080/fhir", std::time::Duration::from_secs(30))?;
//! let mapper = MhdMapper::new(RepositorySettings::default())?;
//! let processor = StoredQueryProcessor::new(Arc::new(backend), Arc::new(mapper), QuerySettings::default());
//!
//! let request = QueryRequest::new(
//!     StoredQuery::GetDocuments(GetByIdQuery {
//!         uuids: vec!["urn:uuid:5e6f1c2a-7f3b-4d2e-9a61-0c4b2f1d9e37".into()],
//!         unique_ids: vec![],
//!     }),
//!     QueryReturnType::LeafClass,
//! );
//! let response = processor.process_query(&request).await?;
//! println!("{} documents", response.document_entries.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`QueryRequest`]: xdsfhir_core::QueryRequest
//! [`RegistryMapper`]: xdsfhir_mapping::RegistryMapper

pub mod associations;
pub mod author;
pub mod collector;
pub mod cursor;
pub mod error;
mod handlers;
pub mod processor;

pub use author::AuthorMatcher;
pub use collector::ResponseCollector;
pub use cursor::{Pages, PagingCursor};
pub use error::QueryError;
pub use processor::{DEFAULT_MAX_RESULTS, QuerySettings, StoredQueryProcessor};
