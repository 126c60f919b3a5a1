use serde::{Serialize, Deserialize};
use std::collections::{HashMap, HashSet};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Opaque document identifier. Caller-assigned, or generated with `DocId::generate`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        DocId(id.into())
    }

    pub fn generate() -> Self {
        DocId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        DocId(id)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        DocId(id.to_string())
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    Boolean(bool),
    Tags(Vec<String>),
}

impl FieldValue {
    /// Textual content used for tokenization; non-text values render to a best-effort string.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Date(d) => d.to_rfc3339(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Tags(tags) => tags.join(" "),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub indexed: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub content_hash: Option<String>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        let now = Utc::now();
        DocumentMetadata {
            indexed: now,
            last_modified: now,
            file_type: None,
            file_size: None,
            content_hash: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub version: u32,
    pub content: String,
    pub modified: DateTime<Utc>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Reference,
    Parent,
    Child,
    Related,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub source: DocId,
    pub target: DocId,
    pub kind: RelationKind,
}

impl Relation {
    pub fn new(source: DocId, target: DocId, kind: RelationKind) -> Self {
        Relation { source, target, kind }
    }

    /// Given one endpoint, returns the other.
    pub fn other(&self, id: &DocId) -> Option<&DocId> {
        if &self.source == id {
            Some(&self.target)
        } else if &self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub fields: HashMap<String, FieldValue>,
    pub metadata: DocumentMetadata,
    pub versions: Vec<DocumentVersion>,
    pub relations: HashSet<Relation>,
}

impl Document {
    pub fn new(id: DocId) -> Self {
        Document {
            id,
            fields: HashMap::new(),
            metadata: DocumentMetadata::default(),
            versions: Vec::new(),
            relations: HashSet::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn add_field(&mut self, name: String, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn content(&self) -> String {
        self.get_field("content").map(|v| v.as_text()).unwrap_or_default()
    }

    /// Normalizes caller-supplied fields: ensures `content` and `tags` exist, bumps timestamps.
    pub fn normalize(&mut self) {
        self.fields.entry("content".to_string()).or_insert_with(|| FieldValue::Text(String::new()));
        self.fields.entry("tags".to_string()).or_insert_with(|| FieldValue::Tags(Vec::new()));
        let now = Utc::now();
        self.metadata.last_modified = now;
    }

    /// Pushes the document's current content onto its version history, trimmed to `max_versions`.
    pub fn push_version(&mut self, author: Option<String>, max_versions: usize) {
        let version = self.versions.last().map(|v| v.version + 1).unwrap_or(1);
        self.versions.push(DocumentVersion {
            version,
            content: self.content(),
            modified: Utc::now(),
            author,
        });
        if self.versions.len() > max_versions {
            let excess = self.versions.len() - max_versions;
            self.versions.drain(0..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_other_resolves_either_endpoint() {
        let a = DocId::new("a");
        let b = DocId::new("b");
        let rel = Relation::new(a.clone(), b.clone(), RelationKind::Reference);
        assert_eq!(rel.other(&a), Some(&b));
        assert_eq!(rel.other(&b), Some(&a));
        assert_eq!(rel.other(&DocId::new("c")), None);
    }

    #[test]
    fn normalize_fills_defaults() {
        let mut doc = Document::new(DocId::new("d1"));
        doc.normalize();
        assert!(matches!(doc.get_field("content"), Some(FieldValue::Text(_))));
        assert!(matches!(doc.get_field("tags"), Some(FieldValue::Tags(_))));
    }

    #[test]
    fn push_version_trims_to_max() {
        let mut doc = Document::new(DocId::new("d1")).with_field("content", FieldValue::Text("v1".into()));
        doc.push_version(None, 2);
        doc.add_field("content".into(), FieldValue::Text("v2".into()));
        doc.push_version(None, 2);
        doc.add_field("content".into(), FieldValue::Text("v3".into()));
        doc.push_version(None, 2);
        assert_eq!(doc.versions.len(), 2);
        assert_eq!(doc.versions[0].content, "v2");
    }
}
