use xdsfhir_core::ErrorCode;
use xdsfhir_storage::StorageError;

/// Errors raised while processing a stored query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The query shape is outside the profile served by this registry.
    #[error("Stored query {query} is not supported: {reason}")]
    Unsupported {
        query: &'static str,
        reason: &'static str,
    },

    /// A search or page fetch failed.
    #[error(transparent)]
    Backend(#[from] StorageError),

    /// An author name pattern could not be compiled.
    #[error("Invalid author pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The query lacks a parameter its shape requires.
    #[error("Invalid {query} query: {message}")]
    InvalidQuery {
        query: &'static str,
        message: String,
    },

    /// `next()` was called on a cursor with no elements left.
    #[error("No more elements present")]
    CursorExhausted,
}

impl QueryError {
    pub fn invalid_query(query: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query,
            message: message.into(),
        }
    }

    /// Returns `true` for query shapes this registry refuses to serve.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Registry error code reported when this failure ends a query.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unsupported { .. } => ErrorCode::UnknownStoredQuery,
            _ => ErrorCode::RegistryError,
        }
    }
}
