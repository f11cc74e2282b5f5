use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use xdsfhir_config::AppConfig;
use xdsfhir_core::{ErrorInfo, QueryRequest, QueryResponse, QueryReturnType, Status, StoredQuery};
use xdsfhir_mapping::MhdMapper;
use xdsfhir_query::StoredQueryProcessor;
use xdsfhir_storage::RestBackend;

use crate::cli::{OutputFormat, QueryArgs};
use crate::output;

pub async fn run(cfg: &AppConfig, args: &QueryArgs, format: OutputFormat) -> Result<()> {
    let query = read_query(&args.file)?;
    let return_type = if args.object_ref {
        QueryReturnType::ObjectRef
    } else {
        QueryReturnType::LeafClass
    };

    let backend = RestBackend::new(&cfg.backend.base_url, cfg.backend.timeout())
        .context("Failed to set up FHIR backend")?;
    let mapper = MhdMapper::new(cfg.repository.clone()).context("Invalid repository settings")?;
    let mut settings = cfg.query.clone();
    if let Some(max_results) = args.max_results {
        settings.max_results = max_results;
    }
    let processor = StoredQueryProcessor::new(Arc::new(backend), Arc::new(mapper), settings);

    match processor
        .process_query(&QueryRequest::new(query, return_type))
        .await
    {
        Ok(response) => output::print_response(&response, format),
        Err(e) => {
            if matches!(format, OutputFormat::Json) {
                output::print_response(&failure_response(&e), format)?;
            }
            Err(e).context("Stored query failed")
        }
    }
}

fn failure_response(err: &xdsfhir_query::QueryError) -> QueryResponse {
    let mut response = QueryResponse::new(Status::Failure);
    response
        .errors
        .push(ErrorInfo::error(err.error_code(), err.to_string()));
    response
}

fn read_query(path: &Path) -> Result<StoredQuery> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse stored query in {}", path.display()))
}
