//! Search parameter names understood by the backend.
//!
//! `DocumentReference` and `List` share most names; where a name is specific
//! to one resource type it is noted.

pub const IDENTIFIER: &str = "identifier";
pub const STATUS: &str = "status";
pub const DATE: &str = "date";
pub const CODE: &str = "code";
pub const PROFILE: &str = "_profile";

/// Chained search on the subject's identifier.
pub const PATIENT_IDENTIFIER: &str = "patient.identifier";

// DocumentReference
pub const CATEGORY: &str = "category";
pub const TYPE: &str = "type";
pub const SETTING: &str = "setting";
pub const FACILITY: &str = "facility";
pub const FORMAT: &str = "format";
pub const EVENT: &str = "event";
pub const SECURITY_LABEL: &str = "security-label";
pub const PERIOD: &str = "period";
pub const RELATESTO: &str = "relatesto";
pub const RELATED_IDENTIFIER: &str = "related:identifier";

// List
pub const ITEM: &str = "item";
pub const SOURCE_ID: &str = "sourceId";
