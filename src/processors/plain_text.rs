use crate::core::types::{DocId, Document, FieldValue};
use crate::processors::traits::{ContentBlock, DocumentProcessor};

pub struct PlainTextProcessor;

impl DocumentProcessor for PlainTextProcessor {
    fn can_process(&self, path: &str, mime_type: Option<&str>) -> bool {
        mime_type.map(|m| m.starts_with("text/plain")).unwrap_or(false)
            || path.ends_with(".txt")
            || (!path.contains('.') && mime_type.is_none())
    }

    fn process(&self, id: &str, text: &str) -> Document {
        Document::new(DocId::new(id)).with_field("content", FieldValue::Text(text.to_string()))
    }

    fn extract_content(&self, text: &str) -> ContentBlock {
        ContentBlock { text: text.to_string() }
    }
}
