//! # xdsfhir-storage
//!
//! Backend side of the stored query engine.
//!
//! This crate defines the contract the engine consumes from a FHIR server:
//! - [`FhirBackend`]: run a search, fetch the next page of a result set
//! - [`SearchParams`]: an ordered, additive list of search criteria
//! - [`Bundle`]: one result page, with bulk extraction of every resource of
//!   a given kind via [`Bundle::resources_of`]
//!
//! It also carries the typed resource views the engine and the mappers work
//! on (`DocumentReference`, `List` and the MHD folder / submission set
//! flavours, `Patient`, `Practitioner`, `PractitionerRole`, `Organization`)
//! and [`RestBackend`], an HTTP implementation of the contract.
//!
//! ## Example
//!
//! ```ignore
//! use xdsfhir_storage::{DocumentReference, FhirBackend, SearchParams, StorageError};
//!
//! async fn first_page(backend: &dyn FhirBackend) -> Result<Vec<DocumentReference>, StorageError> {
//!     let params = SearchParams::new("DocumentReference")
//!         .with_param("patient.identifier", "urn:oid:1.2|id1");
//!     backend.search(&params).await?.resources_of::<DocumentReference>()
//! }
//! ```

mod bundle;
mod error;
pub mod reference;
pub mod resources;
mod rest;
mod traits;
mod types;

pub use bundle::{Bundle, BundleEntry, BundleLink, ReferenceResolver};
pub use error::{ErrorCategory, StorageError};
pub use reference::{FhirReference, UnresolvableReference, parse_reference};
pub use resources::{
    Attachment, CodeableConcept, Coding, ContactPoint, DocumentReference,
    DocumentReferenceContent, DocumentReferenceContext, Extension, FhirResource, HumanName,
    Identified, Identifier, IdentifierUse, ListEntry, ListResource, Meta, MhdFolder,
    MhdSubmissionSet, Organization, Patient, Period, Practitioner, PractitionerRole, Reference,
    RelatesTo, ResolvedResource,
};
pub use rest::RestBackend;
pub use traits::FhirBackend;
pub use types::SearchParams;

/// Shared handle to a backend.
pub type DynBackend = std::sync::Arc<dyn FhirBackend>;
