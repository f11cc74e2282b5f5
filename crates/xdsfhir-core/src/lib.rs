pub mod association;
pub mod error;
pub mod id;
pub mod metadata;
pub mod query;
pub mod response;
pub mod time;
pub mod vocabulary;

pub use association::{Association, AssociationLabel, AssociationType};
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{generate_urn_uuid, is_oid, is_urn};
pub use metadata::{
    Author, AvailabilityStatus, Code, DocumentEntry, Folder, Identifiable, MetadataObject,
    Organization, Person, PersonName, ReferenceId, SubmissionSet,
};
pub use query::{
    FindDocumentsByReferenceIdQuery, FindDocumentsQuery, FindFoldersQuery,
    FindSubmissionSetsQuery, GetAllQuery, GetByIdQuery, GetByUuidQuery, GetContentsQuery,
    GetFromDocumentQuery, QueryList, QueryRequest, QueryReturnType, StoredQuery, TimeRange,
};
pub use response::{ErrorCode, ErrorInfo, ObjectReference, QueryResponse, Severity, Status};
pub use time::{Precision, Timestamp};
