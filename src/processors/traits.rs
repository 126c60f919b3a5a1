use crate::core::types::Document;

pub struct ContentBlock {
    pub text: String,
}

/// External collaborator boundary: produces a `Document` from raw bytes or text.
/// Only a plain-text implementation ships with this engine; HTML/Markdown/binary
/// sniffing processors are expected to satisfy this same trait from outside.
pub trait DocumentProcessor: Send + Sync {
    fn can_process(&self, path: &str, mime_type: Option<&str>) -> bool;
    fn process(&self, id: &str, text: &str) -> Document;
    fn extract_content(&self, text: &str) -> ContentBlock;
}

pub struct ProcessorFactory {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl ProcessorFactory {
    pub fn new(processors: Vec<Box<dyn DocumentProcessor>>) -> Self {
        ProcessorFactory { processors }
    }

    /// First matching processor in priority order, or `None` if none claims the input.
    pub fn select(&self, path: &str, mime_type: Option<&str>) -> Option<&dyn DocumentProcessor> {
        self.processors.iter().find(|p| p.can_process(path, mime_type)).map(|p| p.as_ref())
    }
}
