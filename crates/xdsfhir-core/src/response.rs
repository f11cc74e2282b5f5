use std::fmt;

use serde::{Deserialize, Serialize};

use crate::association::Association;
use crate::metadata::{DocumentEntry, Folder, SubmissionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Success,
    PartialSuccess,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::PartialSuccess => write!(f, "PARTIAL_SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    TooManyResults,
    UnknownStoredQuery,
    RegistryError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyResults => write!(f, "XDSTooManyResults"),
            Self::UnknownStoredQuery => write!(f, "XDSUnknownStoredQuery"),
            Self::RegistryError => write!(f, "XDSRegistryError"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub context: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ErrorInfo {
    pub fn warning(code: ErrorCode, context: impl Into<String>) -> Self {
        Self {
            code,
            context: context.into(),
            severity: Severity::Warning,
            location: None,
        }
    }

    pub fn error(code: ErrorCode, context: impl Into<String>) -> Self {
        Self {
            code,
            context: context.into(),
            severity: Severity::Error,
            location: None,
        }
    }
}

/// Opaque handle returned instead of a full object in reference mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    pub id: String,
}

impl ObjectReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Result of one stored query.
///
/// In reference mode the four leaf collections stay empty and `references`
/// carries one entry per returned object or association.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResponse {
    pub status: Status,
    pub document_entries: Vec<DocumentEntry>,
    pub folders: Vec<Folder>,
    pub submission_sets: Vec<SubmissionSet>,
    pub associations: Vec<Association>,
    pub references: Vec<ObjectReference>,
    pub errors: Vec<ErrorInfo>,
}

impl QueryResponse {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Number of objects in the three object collections.
    pub fn object_count(&self) -> usize {
        self.document_entries.len() + self.folders.len() + self.submission_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_count() == 0 && self.associations.is_empty() && self.references.is_empty()
    }
}
