//! Identifier helpers: OID / URN recognition and association id minting.

use std::sync::LazyLock;

use regex::Regex;

use crate::vocabulary::UUID_URN;

static OID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-2](\.(0|[1-9][0-9]*))+$").expect("valid OID pattern"));

// RFC 8141: NID of 2..32 chars, then a non-empty NSS.
static URN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^urn:[a-z0-9][a-z0-9-]{0,30}[a-z0-9]:\S+$").expect("valid URN pattern")
});

/// Mint a fresh `urn:uuid:` identifier for an association without a stored id.
pub fn generate_urn_uuid() -> String {
    format!("{UUID_URN}{}", uuid::Uuid::new_v4())
}

pub fn is_oid(value: &str) -> bool {
    OID_PATTERN.is_match(value)
}

pub fn is_urn(value: &str) -> bool {
    URN_PATTERN.is_match(value)
}

pub fn is_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}
