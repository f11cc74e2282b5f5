//! Errors raised while talking to the FHIR backend.

use std::fmt;

/// Errors that can occur during backend calls.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Diagnostics from an OperationOutcome, or the raw body.
        message: String,
    },

    /// Failed to reach the backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// A result page could not be decoded.
    #[error("Invalid bundle: {message}")]
    InvalidBundle {
        /// Description of what was wrong with the page.
        message: String,
    },

    /// The search could not be turned into a request.
    #[error("Invalid search: {message}")]
    InvalidSearch {
        /// Description of the problem.
        message: String,
    },

    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `Http` error.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidBundle` error.
    #[must_use]
    pub fn invalid_bundle(message: impl Into<String>) -> Self {
        Self::InvalidBundle {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidSearch` error.
    #[must_use]
    pub fn invalid_search(message: impl Into<String>) -> Self {
        Self::InvalidSearch {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the backend could not be reached.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError { .. })
    }

    /// Returns the HTTP status for backend-reported errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { status, .. } if *status < 500 => ErrorCategory::Rejected,
            Self::Http { .. } => ErrorCategory::Backend,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::InvalidBundle { .. } => ErrorCategory::Serialization,
            Self::InvalidSearch { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_bundle(err.to_string())
        } else {
            Self::connection_error(err.to_string())
        }
    }
}

/// Categories of backend errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The backend rejected the request (4xx).
    Rejected,
    /// The backend failed while serving the request (5xx).
    Backend,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Payload could not be decoded.
    Serialization,
    /// Search could not be built.
    Validation,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "rejected"),
            Self::Backend => write!(f, "backend"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Serialization => write!(f, "serialization"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
