use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::filters::suffix::SuffixFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use crate::core::error::{Error, ErrorKind, Result};

/// Text analysis pipeline: one tokenizer followed by an ordered chain of filters.
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Lowercase, strip stop words, apply the suffix heuristic.
    pub fn standard_english() -> Self {
        Analyzer::new("standard_english".to_string(), Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StopWordFilter::english()))
            .add_filter(Box::new(SuffixFilter))
    }
}

/// Registry for managing named analyzers.
pub struct AnalyzerRegistry {
    analyzers: Arc<RwLock<HashMap<String, Arc<Analyzer>>>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        let registry = AnalyzerRegistry {
            analyzers: Arc::new(RwLock::new(HashMap::new())),
        };
        registry.register("standard", Analyzer::standard_english());
        registry
    }

    pub fn register(&self, name: &str, analyzer: Analyzer) {
        let mut analyzers = self.analyzers.write().unwrap();
        analyzers.insert(name.to_string(), Arc::new(analyzer));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Analyzer>> {
        let analyzers = self.analyzers.read().unwrap();
        analyzers.get(name).cloned()
    }

    pub fn analyze(&self, analyzer_name: &str, text: &str) -> Result<Vec<Token>> {
        self.get(analyzer_name)
            .map(|analyzer| analyzer.analyze(text))
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("analyzer '{}' not found", analyzer_name)))
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_english_strips_stopwords_and_suffixes() {
        let analyzer = Analyzer::standard_english();
        let tokens = analyzer.analyze("The cats are running");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["cat", "run"]);
    }

    #[test]
    fn registry_resolves_default_analyzer() {
        let registry = AnalyzerRegistry::new();
        let tokens = registry.analyze("standard", "Hello World").unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn registry_errors_on_unknown_analyzer() {
        let registry = AnalyzerRegistry::new();
        assert!(registry.analyze("missing", "text").is_err());
    }
}
