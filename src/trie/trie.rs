use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocId;
use crate::trie::levenshtein::distance;
use crate::trie::node::TrieNode;

const DEFAULT_MAX_WORD_LENGTH: usize = 50;

#[derive(Debug, Clone)]
pub struct TrieHit {
    pub doc_id: DocId,
    pub term: String,
    pub edit_distance: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SerializedTrie {
    pub root: TrieNode,
    pub total_documents: usize,
}

/// In-memory character trie. One instance backs one named corpus.
pub struct Trie {
    root: TrieNode,
    pub max_word_length: usize,
    pub total_documents: usize,
}

impl Trie {
    pub fn new() -> Self {
        Trie {
            root: TrieNode::new(0),
            max_word_length: DEFAULT_MAX_WORD_LENGTH,
            total_documents: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        fn count(node: &TrieNode) -> usize {
            1 + node.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    pub fn insert(&mut self, word: &str, doc_id: DocId) -> Result<()> {
        if word.is_empty() {
            return Err(Error::new(ErrorKind::InvalidArgument, "cannot index an empty word"));
        }
        if word.chars().count() > self.max_word_length {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("word exceeds max_word_length of {}", self.max_word_length),
            ));
        }

        let mut node = &mut self.root;
        for ch in word.chars() {
            node.prefix_count += 1;
            node = node.children.entry(ch).or_insert_with(|| TrieNode::new(node.depth + 1));
        }
        node.prefix_count += 1;
        node.end_of_word = true;
        node.document_refs.insert(doc_id);
        node.increment_weight(1.0);
        Ok(())
    }

    /// Removes all occurrences of `doc_id` from the trie, then prunes empty leaves.
    pub fn remove_document_refs(&mut self, doc_id: &DocId) {
        fn recurse(node: &mut TrieNode, doc_id: &DocId) {
            if node.document_refs.remove(doc_id) {
                node.decrement();
            }
            for child in node.children.values_mut() {
                recurse(child, doc_id);
            }
        }
        recurse(&mut self.root, doc_id);
        self.prune();
    }

    pub fn prune(&mut self) {
        fn recurse(node: &mut TrieNode) {
            node.children.retain(|_, child| {
                recurse(child);
                !child.is_prunable()
            });
        }
        recurse(&mut self.root);
    }

    fn navigate(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    pub fn exact_search(&self, word: &str) -> Vec<TrieHit> {
        match self.navigate(word) {
            Some(node) if node.end_of_word => node
                .document_refs
                .iter()
                .map(|id| TrieHit { doc_id: id.clone(), term: word.to_string(), edit_distance: None })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn prefix_search(&self, prefix: &str) -> Vec<TrieHit> {
        let Some(start) = self.navigate(prefix) else { return Vec::new() };
        let mut hits = Vec::new();
        Self::collect_words(start, prefix.to_string(), &mut hits);
        hits
    }

    fn collect_words(node: &TrieNode, path: String, hits: &mut Vec<TrieHit>) {
        if node.end_of_word {
            for id in &node.document_refs {
                hits.push(TrieHit { doc_id: id.clone(), term: path.clone(), edit_distance: None });
            }
        }
        for (ch, child) in &node.children {
            let mut next = path.clone();
            next.push(*ch);
            Self::collect_words(child, next, hits);
        }
    }

    /// Bounded recursive fuzzy search: enumerates words within `max_distance` of `word`.
    pub fn fuzzy_search(&self, word: &str, max_distance: usize) -> Vec<TrieHit> {
        let target: Vec<char> = word.chars().collect();
        let mut hits = Vec::new();
        Self::fuzzy_recurse(&self.root, &target, String::new(), max_distance, &mut hits);
        hits
    }

    fn fuzzy_recurse(node: &TrieNode, target: &[char], path: String, max_distance: usize, hits: &mut Vec<TrieHit>) {
        if node.end_of_word {
            let d = distance(&path, &target.iter().collect::<String>());
            if d <= max_distance {
                for id in &node.document_refs {
                    hits.push(TrieHit { doc_id: id.clone(), term: path.clone(), edit_distance: Some(d) });
                }
            }
        }
        if path.chars().count() as isize - target.len() as isize > max_distance as isize {
            return;
        }
        for (ch, child) in &node.children {
            let mut next = path.clone();
            next.push(*ch);
            Self::fuzzy_recurse(child, target, next, max_distance, hits);
        }
    }

    /// Top `max_results` words under `prefix`, ranked by node score.
    pub fn suggestions(&self, prefix: &str, max_results: usize) -> Vec<String> {
        let Some(start) = self.navigate(prefix) else { return Vec::new() };
        let mut scored: Vec<(String, f64)> = Vec::new();
        Self::collect_scored(start, prefix.to_string(), &mut scored);
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(max_results).map(|(w, _)| w).collect()
    }

    fn collect_scored(node: &TrieNode, path: String, out: &mut Vec<(String, f64)>) {
        if node.end_of_word {
            out.push((path.clone(), node.score()));
        }
        for (ch, child) in &node.children {
            let mut next = path.clone();
            next.push(*ch);
            Self::collect_scored(child, next, out);
        }
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    pub fn node_at(&self, path: &str) -> Option<&TrieNode> {
        self.navigate(path)
    }

    pub fn to_serialized(&self) -> SerializedTrie {
        SerializedTrie { root: self.root.clone(), total_documents: self.total_documents }
    }

    pub fn from_serialized(state: SerializedTrie) -> Self {
        Trie {
            root: state.root,
            max_word_length: DEFAULT_MAX_WORD_LENGTH,
            total_documents: state.total_documents,
        }
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> DocId {
        DocId::new(id)
    }

    #[test]
    fn insert_then_exact_search_finds_document() {
        let mut trie = Trie::new();
        trie.insert("javascript", doc("d1")).unwrap();
        let hits = trie.exact_search("javascript");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, doc("d1"));
    }

    #[test]
    fn prefix_search_is_superset_of_exact_search() {
        let mut trie = Trie::new();
        trie.insert("apple", doc("d1")).unwrap();
        trie.insert("application", doc("d2")).unwrap();
        let exact = trie.exact_search("apple");
        let prefix = trie.prefix_search("app");
        for hit in exact {
            assert!(prefix.iter().any(|h| h.doc_id == hit.doc_id && h.term == hit.term));
        }
        assert_eq!(prefix.len(), 2);
    }

    #[test]
    fn fuzzy_search_respects_distance_bound() {
        let mut trie = Trie::new();
        trie.insert("programming", doc("d1")).unwrap();
        let hits = trie.fuzzy_search("programing", 1);
        assert!(hits.iter().any(|h| h.doc_id == doc("d1")));
        let none = trie.fuzzy_search("completely", 1);
        assert!(none.is_empty());
    }

    #[test]
    fn remove_document_refs_prunes_orphaned_path() {
        let mut trie = Trie::new();
        trie.insert("unique", doc("d1")).unwrap();
        trie.remove_document_refs(&doc("d1"));
        assert!(trie.exact_search("unique").is_empty());
        assert_eq!(trie.node_count(), 1);
    }

    #[test]
    fn insert_rejects_empty_or_overlong_words() {
        let mut trie = Trie::new();
        assert!(trie.insert("", doc("d1")).is_err());
        let long = "a".repeat(trie.max_word_length + 1);
        assert!(trie.insert(&long, doc("d1")).is_err());
    }

    #[test]
    fn round_trip_serialization_preserves_search_results() {
        let mut trie = Trie::new();
        trie.insert("roundtrip", doc("d1")).unwrap();
        let serialized = trie.to_serialized();
        let json = serde_json::to_string(&serialized).unwrap();
        let back: SerializedTrie = serde_json::from_str(&json).unwrap();
        let restored = Trie::from_serialized(back);
        assert_eq!(restored.exact_search("roundtrip").len(), 1);
    }
}
