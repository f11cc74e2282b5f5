//! # xdsfhir-search
//!
//! Pure functions translating stored query predicates into backend search
//! criteria. Each function appends to a [`SearchParams`]; applying several
//! to the same search accumulates criteria and never replaces one.
//!
//! ```
//! use xdsfhir_core::{AvailabilityStatus, Identifiable};
//! use xdsfhir_search::{templates, token};
//!
//! let mut search = templates::folders();
//! token::patient(&mut search, &Identifiable::new("id3", Some("1.3".into())));
//! token::status(&mut search, &[AvailabilityStatus::Approved]);
//!
//! assert_eq!(search.values("patient.identifier"), vec!["urn:oid:1.3|id3"]);
//! assert_eq!(search.values("status"), vec!["current"]);
//! ```
//!
//! [`SearchParams`]: xdsfhir_storage::SearchParams

pub mod chaining;
pub mod date;
pub mod include;
pub mod parameters;
pub mod reverse_chaining;
pub mod templates;
pub mod token;

pub use chaining::ItemTarget;
pub use include::IncludeParam;
