use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationType {
    HasMember,
    Replace,
    Append,
    Transform,
    Signs,
}

impl AssociationType {
    /// Whether this type links two document entries.
    pub fn is_document_relationship(&self) -> bool {
        !matches!(self, Self::HasMember)
    }
}

impl fmt::Display for AssociationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasMember => write!(f, "HAS_MEMBER"),
            Self::Replace => write!(f, "REPLACE"),
            Self::Append => write!(f, "APPEND"),
            Self::Transform => write!(f, "TRANSFORM"),
            Self::Signs => write!(f, "SIGNS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationLabel {
    Original,
    Reference,
}

/// A directed, typed edge between two registry objects, or between a
/// submission set and another association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub entry_uuid: String,
    pub association_type: AssociationType,
    pub source_uuid: String,
    pub target_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<AssociationLabel>,
}

impl Association {
    pub fn new(
        association_type: AssociationType,
        entry_uuid: impl Into<String>,
        source_uuid: impl Into<String>,
        target_uuid: impl Into<String>,
    ) -> Self {
        Self {
            entry_uuid: entry_uuid.into(),
            association_type,
            source_uuid: source_uuid.into(),
            target_uuid: target_uuid.into(),
            label: None,
        }
    }

    /// A `HAS_MEMBER` edge labelled as an original submission.
    pub fn original_member(
        entry_uuid: impl Into<String>,
        source_uuid: impl Into<String>,
        target_uuid: impl Into<String>,
    ) -> Self {
        Self::new(AssociationType::HasMember, entry_uuid, source_uuid, target_uuid)
            .with_label(AssociationLabel::Original)
    }

    #[must_use]
    pub fn with_label(mut self, label: AssociationLabel) -> Self {
        self.label = Some(label);
        self
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({})",
            self.association_type, self.source_uuid, self.target_uuid, self.entry_uuid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_member() {
        let assoc = Association::original_member("urn:uuid:a1", "urn:uuid:ss", "urn:uuid:doc");
        assert_eq!(assoc.association_type, AssociationType::HasMember);
        assert_eq!(assoc.label, Some(AssociationLabel::Original));
        assert_eq!(
            assoc.to_string(),
            "HAS_MEMBER urn:uuid:ss -> urn:uuid:doc (urn:uuid:a1)"
        );
    }

    #[test]
    fn test_document_relationship_types() {
        assert!(!AssociationType::HasMember.is_document_relationship());
        assert!(AssociationType::Replace.is_document_relationship());
        assert!(AssociationType::Signs.is_document_relationship());
    }

    #[test]
    fn test_association_json_shape() {
        let assoc = Association::new(AssociationType::Replace, "r1", "d1", "d2");
        let json = serde_json::to_value(&assoc).unwrap();
        assert_eq!(json["associationType"], "REPLACE");
        assert_eq!(json["sourceUuid"], "d1");
        assert!(json.get("label").is_none());
    }
}
