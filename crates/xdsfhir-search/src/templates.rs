//! Base searches for the three registry object kinds.
//!
//! Documents are `DocumentReference`s with the MHD comprehensive profile.
//! Folders and submission sets are both `List`s and are told apart by
//! profile and list type code.

use xdsfhir_core::vocabulary::{
    FOLDER_LIST_CODE, MHD_COMPREHENSIVE_FOLDER_PROFILE, MHD_COMPREHENSIVE_PROFILE,
    MHD_COMPREHENSIVE_SUBMISSIONSET_PROFILE, MHD_LIST_TYPES_SYSTEM, SUBMISSIONSET_LIST_CODE,
};
use xdsfhir_storage::SearchParams;

use crate::include::{IncludeParam, include};
use crate::parameters::{CODE, PROFILE};

pub fn documents() -> SearchParams {
    let mut params = SearchParams::new("DocumentReference").with_param(PROFILE, MHD_COMPREHENSIVE_PROFILE);
    include(&mut params, IncludeParam::DOCUMENT_SUBJECT);
    params
}

pub fn folders() -> SearchParams {
    list(MHD_COMPREHENSIVE_FOLDER_PROFILE, FOLDER_LIST_CODE)
}

pub fn submission_sets() -> SearchParams {
    list(MHD_COMPREHENSIVE_SUBMISSIONSET_PROFILE, SUBMISSIONSET_LIST_CODE)
}

fn list(profile: &str, list_type: &str) -> SearchParams {
    let mut params = SearchParams::new("List")
        .with_param(PROFILE, profile)
        .with_param(CODE, format!("{MHD_LIST_TYPES_SYSTEM}|{list_type}"));
    include(&mut params, IncludeParam::LIST_SUBJECT);
    params
}
