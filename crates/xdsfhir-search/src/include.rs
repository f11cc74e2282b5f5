//! `_include` and `_revinclude` criteria.
//!
//! Included resources land on the same result page as the matches and are
//! used to resolve references (subjects, related documents, list items).

use std::fmt;

use xdsfhir_storage::SearchParams;

/// An include of a reference parameter of `source_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeParam {
    pub source_type: &'static str,
    pub search_param: &'static str,
    /// `_revinclude` instead of `_include`
    pub reverse: bool,
}

impl IncludeParam {
    pub const DOCUMENT_SUBJECT: Self = Self::include("DocumentReference", "subject");
    pub const DOCUMENT_RELATESTO: Self = Self::include("DocumentReference", "relatesto");
    pub const LIST_SUBJECT: Self = Self::include("List", "subject");
    pub const LIST_ITEM: Self = Self::include("List", "item");
    /// Lists that have the matched resource as an item.
    pub const REV_LIST_ITEM: Self = Self::revinclude("List", "item");

    pub const fn include(source_type: &'static str, search_param: &'static str) -> Self {
        Self {
            source_type,
            search_param,
            reverse: false,
        }
    }

    pub const fn revinclude(source_type: &'static str, search_param: &'static str) -> Self {
        Self {
            source_type,
            search_param,
            reverse: true,
        }
    }

    pub fn parameter_name(&self) -> &'static str {
        if self.reverse { "_revinclude" } else { "_include" }
    }
}

impl fmt::Display for IncludeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.search_param)
    }
}

pub fn include(params: &mut SearchParams, include: IncludeParam) {
    params.add_param(include.parameter_name(), include.to_string());
}
