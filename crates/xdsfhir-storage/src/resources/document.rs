use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CodeableConcept, Coding, FhirResource, Identified, Identifier, Meta, Period, Reference};
use crate::bundle::ReferenceResolver;

/// `DocumentReference` as published by an MHD document recipient.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contained: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relates_to: Vec<RelatesTo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_label: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocumentReferenceContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<DocumentReferenceContext>,
}

impl DocumentReference {
    pub fn attachment(&self) -> Option<&Attachment> {
        self.content.first().map(|content| &content.attachment)
    }

    pub fn format(&self) -> Option<&Coding> {
        self.content.first().and_then(|content| content.format.as_ref())
    }
}

impl FhirResource for DocumentReference {
    const RESOURCE_TYPE: &'static str = "DocumentReference";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn resolve_references(&mut self, resolver: &ReferenceResolver<'_>) {
        let contained = std::mem::take(&mut self.contained);
        let scope = resolver.scoped(&contained);

        let references = self
            .subject
            .iter_mut()
            .chain(self.author.iter_mut())
            .chain(self.authenticator.iter_mut())
            .chain(self.relates_to.iter_mut().map(|rel| &mut rel.target));
        for reference in references {
            scope.resolve(reference);
        }
        if let Some(context) = self.context.as_mut() {
            for reference in context
                .source_patient_info
                .iter_mut()
                .chain(context.related.iter_mut())
            {
                scope.resolve(reference);
            }
        }

        self.contained = contained;
    }
}

impl Identified for DocumentReference {
    fn identifiers(&self) -> &[Identifier] {
        &self.identifier
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelatesTo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub target: Reference,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentReferenceContent {
    pub attachment: Attachment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Coding>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Base64 encoded SHA-1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentReferenceContext {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_setting: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_patient_info: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_document_reference() {
        let doc: DocumentReference = serde_json::from_value(json!({
            "resourceType": "DocumentReference",
            "id": "d1",
            "masterIdentifier": {"value": "urn:oid:1.2.3.4"},
            "identifier": [{"use": "official", "value": "urn:uuid:doc-1"}],
            "status": "current",
            "subject": {"reference": "Patient/p1"},
            "relatesTo": [{"code": "replaces", "target": {"reference": "DocumentReference/d0"}}],
            "content": [{
                "attachment": {"contentType": "application/pdf", "size": 42, "url": "http://repo/doc/1"},
                "format": {"system": "urn:oid:1.3.6.1.4.1.19376.1.2.3", "code": "urn:ihe:pcc:xphr:2007"}
            }],
            "context": {"period": {"start": "2020-01-01T10:00:00Z"}}
        }))
        .unwrap();

        assert_eq!(doc.entry_uuid(), Some("urn:uuid:doc-1"));
        assert_eq!(doc.relates_to[0].code, "replaces");
        assert_eq!(doc.attachment().and_then(|a| a.size), Some(42));
        assert_eq!(
            doc.format().and_then(|f| f.code.as_deref()),
            Some("urn:ihe:pcc:xphr:2007")
        );
        assert!(doc.subject.as_ref().unwrap().resolved().is_none());
    }
}
