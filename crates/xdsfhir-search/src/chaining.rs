//! Forward chained criteria.
//!
//! A chain searches on a property of a referenced resource:
//! - `item:DocumentReference.identifier` - lists containing a document with
//!   the identifier
//! - `item:List.identifier` - lists containing a list with the identifier
//! - `relatesto.identifier` - documents related to a document with the
//!   identifier

use xdsfhir_storage::SearchParams;

use crate::parameters::{IDENTIFIER, ITEM, RELATESTO};
use crate::token::uri_identifiers;

/// Resource type a list entry item is chained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTarget {
    DocumentReference,
    List,
}

impl ItemTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentReference => "DocumentReference",
            Self::List => "List",
        }
    }

    /// Parameter name, e.g. `item:DocumentReference.identifier`.
    pub fn parameter(&self) -> String {
        format!("{ITEM}:{}.{IDENTIFIER}", self.as_str())
    }
}

/// Lists with an entry whose item carries one of the identifiers.
pub fn item_identifier<S: AsRef<str>>(params: &mut SearchParams, target: ItemTarget, values: &[S]) {
    uri_identifiers(params, &target.parameter(), values);
}

/// Documents whose `relatesTo` target carries one of the identifiers.
pub fn relates_to_identifier<S: AsRef<str>>(params: &mut SearchParams, values: &[S]) {
    uri_identifiers(params, &format!("{RELATESTO}.{IDENTIFIER}"), values);
}

/// Only documents that carry at least one `relatesTo`.
pub fn relates_to_present(params: &mut SearchParams) {
    params.add_param(format!("{RELATESTO}:missing"), "false");
}
