use std::collections::{HashMap, HashSet};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::types::DocId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrieNode {
    pub children: HashMap<char, TrieNode>,
    pub end_of_word: bool,
    pub document_refs: HashSet<DocId>,
    pub weight: f64,
    pub frequency: u64,
    pub depth: u32,
    pub prefix_count: u64,
    pub last_accessed: i64,
}

impl TrieNode {
    pub fn new(depth: u32) -> Self {
        TrieNode {
            children: HashMap::new(),
            end_of_word: false,
            document_refs: HashSet::new(),
            weight: 0.0,
            frequency: 0,
            depth,
            prefix_count: 0,
            last_accessed: Utc::now().timestamp_millis(),
        }
    }

    pub fn increment_weight(&mut self, amount: f64) {
        self.weight += amount;
        self.frequency += 1;
        self.last_accessed = Utc::now().timestamp_millis();
    }

    pub fn decrement(&mut self) {
        self.weight = (self.weight - 1.0).max(0.0);
        self.frequency = self.frequency.saturating_sub(1);
        self.prefix_count = self.prefix_count.saturating_sub(1);
    }

    /// A leaf with no refs, no weight, and no frequency carries no information and can
    /// be removed from the trie.
    pub fn is_prunable(&self) -> bool {
        self.children.is_empty()
            && self.document_refs.is_empty()
            && self.weight == 0.0
            && self.frequency == 0
    }

    pub fn recency(&self) -> f64 {
        let now = Utc::now().timestamp_millis();
        let age_ms = (now - self.last_accessed).max(0) as f64;
        (-age_ms / 86_400_000.0).exp()
    }

    /// Raw relevance score used when corpus-level statistics are unavailable.
    pub fn score(&self) -> f64 {
        self.weight * self.frequency as f64 * self.recency() / (self.depth as f64 + 1.0)
    }
}
