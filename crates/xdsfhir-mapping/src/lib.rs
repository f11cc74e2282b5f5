//! # xdsfhir-mapping
//!
//! Converts MHD resources read from the backend into registry metadata.
//!
//! A mapper never fails on a single resource: a resource that cannot
//! represent a registry object (no identifier, no patient identifier) maps
//! to `None` and the engine drops it. Only constructing a mapper can fail,
//! when an endpoint template does not compile.

mod document;
mod error;
mod list;
pub mod settings;
mod support;

pub use error::MappingError;
pub use settings::{DOCUMENT_UNIQUE_ID_PLACEHOLDER, RepositorySettings};

use settings::RepositoryMatcher;
use xdsfhir_core::{DocumentEntry, Folder, SubmissionSet};
use xdsfhir_storage::{DocumentReference, MhdFolder, MhdSubmissionSet};

/// Backend resource to registry object conversion used by the query engine.
pub trait RegistryMapper: Send + Sync {
    fn map_document(&self, doc: &DocumentReference) -> Option<DocumentEntry>;

    fn map_folder(&self, folder: &MhdFolder) -> Option<Folder>;

    fn map_submission_set(&self, submission_set: &MhdSubmissionSet) -> Option<SubmissionSet>;
}

/// Mapper for resources following the MHD comprehensive profiles.
#[derive(Debug, Clone)]
pub struct MhdMapper {
    settings: RepositorySettings,
    repositories: RepositoryMatcher,
}

impl MhdMapper {
    pub fn new(settings: RepositorySettings) -> Result<Self, MappingError> {
        let repositories = RepositoryMatcher::compile(&settings)?;
        Ok(Self {
            settings,
            repositories,
        })
    }

    pub fn settings(&self) -> &RepositorySettings {
        &self.settings
    }
}

impl RegistryMapper for MhdMapper {
    fn map_document(&self, doc: &DocumentReference) -> Option<DocumentEntry> {
        document::map_document(doc, &self.repositories, &self.settings.default_hash)
    }

    fn map_folder(&self, folder: &MhdFolder) -> Option<Folder> {
        list::map_folder(folder)
    }

    fn map_submission_set(&self, submission_set: &MhdSubmissionSet) -> Option<SubmissionSet> {
        list::map_submission_set(submission_set)
    }
}
