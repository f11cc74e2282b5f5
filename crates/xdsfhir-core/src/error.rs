use thiserror::Error;

/// Core error types for registry metadata handling
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidIdentifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Create a new InvalidTimestamp error
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp(message.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentifier(_) | Self::InvalidTimestamp(_) => ErrorCategory::Validation,
            Self::JsonError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for logging and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_identifier_error() {
        let err = CoreError::invalid_identifier("not-an-oid");
        assert_eq!(err.to_string(), "Invalid identifier: not-an-oid");
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_invalid_timestamp_error() {
        let err = CoreError::invalid_timestamp("2020-13");
        assert_eq!(err.to_string(), "Invalid timestamp: 2020-13");
        assert_eq!(err.category().to_string(), "validation");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert_eq!(err.category(), ErrorCategory::Serialization);
    }
}
