use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::types::{DocId, Document};

#[derive(Debug, Clone)]
pub struct HighlightSpan {
    pub field: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub score: f32,
    pub document: Option<Document>,
    pub matched_terms: Vec<String>,
    pub edit_distance: Option<usize>,
    pub highlights: Vec<HighlightSpan>,
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for SearchResult {}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Reversed so a `BinaryHeap<SearchResult>` behaves as a min-heap on score,
        // letting `TopKCollector` evict the lowest-scoring entry cheaply.
        other.score.partial_cmp(&self.score)
    }
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub hits: Vec<SearchResult>,
    pub total_hits: usize,
    pub max_score: f32,
    pub took_ms: u64,
}

/// Bounded top-K selection over a score-ordered stream of hits.
pub struct TopKCollector {
    heap: BinaryHeap<SearchResult>,
    k: usize,
    min_score: f32,
    pub total_collected: usize,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        TopKCollector {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
            min_score: f32::MIN,
            total_collected: 0,
        }
    }

    pub fn collect(&mut self, result: SearchResult) {
        self.total_collected += 1;

        if self.heap.len() < self.k || result.score > self.min_score {
            self.heap.push(result);
            if self.heap.len() > self.k {
                self.heap.pop();
            }
            if let Some(min) = self.heap.peek() {
                self.min_score = min.score;
            }
        }
    }

    pub fn get_results(self) -> Vec<SearchResult> {
        let mut results: Vec<_> = self.heap.into_iter().collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results
    }

    pub fn max_score(&self) -> f32 {
        self.heap.iter().map(|r| r.score).fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f32) -> SearchResult {
        SearchResult {
            doc_id: DocId::new(id),
            score,
            document: None,
            matched_terms: vec![],
            edit_distance: None,
            highlights: vec![],
        }
    }

    #[test]
    fn top_k_keeps_highest_scores() {
        let mut collector = TopKCollector::new(2);
        collector.collect(hit("a", 1.0));
        collector.collect(hit("b", 3.0));
        collector.collect(hit("c", 2.0));
        let results = collector.get_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].doc_id, DocId::new("b"));
        assert_eq!(results[1].doc_id, DocId::new("c"));
    }

    #[test]
    fn total_collected_counts_every_call() {
        let mut collector = TopKCollector::new(1);
        collector.collect(hit("a", 1.0));
        collector.collect(hit("b", 2.0));
        collector.collect(hit("c", 0.5));
        assert_eq!(collector.total_collected, 3);
    }
}
