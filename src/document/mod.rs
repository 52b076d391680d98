//! Retrievable documents projected from the graph
//!
//! A [`Document`] is rendered prose plus typed metadata. Documents are
//! disposable: they are regenerated in full whenever the index is rebuilt.

pub mod synthesizer;

pub use synthesizer::{DocumentSynthesizer, SynthesisConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed metadata value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Integer(i64),
    Text(String),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::Integer(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(n) => Some(*n),
            MetaValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Integer(n) => write!(f, "{}", n),
            MetaValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        MetaValue::Integer(n)
    }
}

impl From<usize> for MetaValue {
    fn from(n: usize) -> Self {
        MetaValue::Integer(n as i64)
    }
}

pub type Metadata = BTreeMap<String, MetaValue>;

/// The `type` discriminator carried in every document's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Entity,
    Officer,
    Investigation,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Entity => "entity",
            DocumentType::Officer => "officer",
            DocumentType::Investigation => "investigation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entity" => Some(DocumentType::Entity),
            "officer" => Some(DocumentType::Officer),
            "investigation" => Some(DocumentType::Investigation),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page content plus metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with only its `type` set
    pub fn new(content: impl Into<String>, doc_type: DocumentType) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("type".to_string(), MetaValue::from(doc_type.as_str()));
        Document {
            content: content.into(),
            metadata,
        }
    }

    /// Builder-style metadata insert
    pub fn with(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetaValue::as_str)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(MetaValue::as_i64)
    }

    pub fn doc_type(&self) -> Option<DocumentType> {
        self.text("type").and_then(DocumentType::parse)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metadata() {
        let doc = Document::new("body", DocumentType::Investigation)
            .with("source", "Panama Papers")
            .with("entity_count", 12usize);

        assert_eq!(doc.doc_type(), Some(DocumentType::Investigation));
        assert_eq!(doc.text("source"), Some("Panama Papers"));
        assert_eq!(doc.integer("entity_count"), Some(12));
        assert_eq!(doc.text("entity_count"), None);
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn test_metadata_serializes_untagged() {
        let doc = Document::new("x", DocumentType::Entity).with("network_degree", 3i64);
        let json = serde_json::to_value(&doc.metadata).unwrap();
        assert_eq!(json["type"], "entity");
        assert_eq!(json["network_degree"], 3);

        let back: Metadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc.metadata);
    }
}
