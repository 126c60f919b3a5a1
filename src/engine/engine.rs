use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::RwLock;
use regex::Regex;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::query_processor::{process_query, Operator, ProcessedQuery};
use crate::cache::manager::{CacheManager, QueryKey};
use crate::core::config::{SearchEngineConfig, SearchOptions};
use crate::core::error::{Error, Result};
use crate::core::events::{EngineEvent, EventEmitter, SharedEventEmitter};
use crate::core::stats::{EngineStats, HealthCheck, HealthCheckResult, HealthStatus};
use crate::core::types::{DocId, Document};
use crate::incremental::manager::IncrementalIndexManager;
use crate::scoring::scorer::{CorpusStats, TrieScorer};
use crate::search::regex_search;
use crate::search::results::{HighlightSpan, SearchResult, SearchResults, TopKCollector};
use crate::storage::adapter::IndexConfigSnapshot;
use crate::storage::persistence::PersistenceManager;
use crate::trie::{Trie, TrieHit};

fn fingerprint(options: &SearchOptions) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    options.fuzzy.hash(&mut hasher);
    options.max_distance.hash(&mut hasher);
    options.prefix_match.hash(&mut hasher);
    options.regex.hash(&mut hasher);
    options.fields.hash(&mut hasher);
    options.case_sensitive.hash(&mut hasher);
    options.max_results.hash(&mut hasher);
    options.page.hash(&mut hasher);
    options.page_size.hash(&mut hasher);
    (options.threshold.to_bits()).hash(&mut hasher);
    (options.min_score.to_bits()).hash(&mut hasher);
    let mut boost: Vec<(&String, &f32)> = options.boost.iter().collect();
    boost.sort_by(|a, b| a.0.cmp(b.0));
    for (k, v) in boost {
        k.hash(&mut hasher);
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Ties together the trie index, cache, storage, and query pipeline behind one
/// synchronous facade. One instance serves one named corpus.
pub struct SearchEngine {
    config: SearchEngineConfig,
    trie: Arc<RwLock<Trie>>,
    documents: Arc<RwLock<HashMap<DocId, Document>>>,
    cache: CacheManager,
    incremental: IncrementalIndexManager,
    events: SharedEventEmitter,
    analyzer: Analyzer,
    scorer: TrieScorer,
    start_time: SystemTime,
    start_instant: Instant,
    total_queries: AtomicU64,
    total_query_latency_ms: AtomicU64,
    writes_total: AtomicU64,
}

impl SearchEngine {
    pub fn new(config: SearchEngineConfig) -> Result<Self> {
        let mut trie = Trie::new();
        trie.max_word_length = config.max_word_length;
        let trie = Arc::new(RwLock::new(trie));
        let documents = Arc::new(RwLock::new(HashMap::new()));
        let persistence = Arc::new(PersistenceManager::open(&config.storage)?);
        let index_config = IndexConfigSnapshot { version: config.version, fields: config.fields.clone() };
        let incremental = IncrementalIndexManager::new(
            config.name.clone(),
            index_config,
            persistence,
            config.incremental.clone(),
            trie.clone(),
            documents.clone(),
        );

        Ok(SearchEngine {
            cache: CacheManager::new(config.cache.clone()),
            analyzer: Analyzer::standard_english(),
            scorer: TrieScorer::new(),
            trie,
            documents,
            incremental,
            events: Arc::new(EventEmitter::new()),
            start_time: SystemTime::now(),
            start_instant: Instant::now(),
            total_queries: AtomicU64::new(0),
            total_query_latency_ms: AtomicU64::new(0),
            writes_total: AtomicU64::new(0),
            config,
        })
    }

    pub fn events(&self) -> SharedEventEmitter {
        self.events.clone()
    }

    /// Loads a previously persisted index for this corpus, if one exists.
    pub fn initialize(&self) -> Result<()> {
        self.incremental.load()?;
        self.events.emit(EngineEvent::Initialized);
        Ok(())
    }

    fn index_document(&self, doc: &Document) {
        let mut trie = self.trie.write();
        for field_name in &self.config.fields {
            if let Some(value) = doc.get_field(field_name) {
                for token in self.analyzer.analyze(&value.as_text()) {
                    let _ = trie.insert(&token.text, doc.id.clone());
                }
            }
        }
        trie.total_documents = self.documents.read().len().max(trie.total_documents);
    }

    pub fn add_document(&self, mut doc: Document) -> Result<()> {
        doc.normalize();
        let id = doc.id.clone();
        self.events.emit(EngineEvent::IndexStart { doc_id: id.clone() });

        self.index_document(&doc);
        self.documents.write().insert(id.clone(), doc);
        self.trie.write().total_documents = self.documents.read().len();
        self.incremental.mark_dirty(id.clone());
        self.writes_total.fetch_add(1, Ordering::Relaxed);
        self.cache.clear();

        if let Err(e) = self.incremental.maybe_autosave() {
            self.events.emit(EngineEvent::IndexError { doc_id: id.clone(), message: e.to_string() });
            return Err(e);
        }
        self.events.emit(EngineEvent::IndexComplete { doc_id: id });
        Ok(())
    }

    pub fn add_documents(&self, docs: Vec<Document>) -> Result<()> {
        let count = docs.len();
        for doc in docs {
            self.add_document(doc)?;
        }
        self.events.emit(EngineEvent::BulkUpdateComplete { count });
        Ok(())
    }

    pub fn update_document(&self, mut doc: Document) -> Result<()> {
        let id = doc.id.clone();
        if let Some(mut existing) = self.documents.read().get(&id).cloned() {
            let versioning = &self.config.document_support.versioning;
            if versioning.enabled && existing.content() != doc.content() {
                existing.push_version(None, versioning.max_versions);
                doc.versions = existing.versions;
            }
            self.trie.write().remove_document_refs(&id);
        }
        self.add_document(doc)
    }

    pub fn remove_document(&self, id: &DocId) -> Result<()> {
        if self.documents.write().remove(id).is_none() {
            let message = format!("document '{}' not found", id);
            self.events.emit(EngineEvent::RemoveError { doc_id: id.clone(), message: message.clone() });
            return Err(Error::not_found(message));
        }
        self.trie.write().remove_document_refs(id);
        self.incremental.mark_dirty(id.clone());
        self.writes_total.fetch_add(1, Ordering::Relaxed);
        self.cache.clear();

        if let Err(e) = self.incremental.maybe_autosave() {
            self.events.emit(EngineEvent::RemoveError { doc_id: id.clone(), message: e.to_string() });
            return Err(e);
        }
        self.events.emit(EngineEvent::RemoveComplete { doc_id: id.clone() });
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        *self.trie.write() = {
            let mut t = Trie::new();
            t.max_word_length = self.config.max_word_length;
            t
        };
        self.documents.write().clear();
        self.cache.clear();
        if let Err(e) = self.incremental.save_index() {
            self.events.emit(EngineEvent::IndexClearError { message: e.to_string() });
            return Err(e);
        }
        self.events.emit(EngineEvent::IndexClear);
        Ok(())
    }

    fn raw_hits(&self, trie: &Trie, term: &str, options: &SearchOptions) -> Vec<TrieHit> {
        if options.fuzzy {
            trie.fuzzy_search(term, options.max_distance as usize)
        } else if options.prefix_match {
            trie.prefix_search(term)
        } else {
            trie.exact_search(term)
        }
    }

    fn doc_ids(hits: &[TrieHit]) -> HashSet<DocId> {
        hits.iter().map(|h| h.doc_id.clone()).collect()
    }

    fn apply_boost(&self, score: f32, term: &str, doc: &Document, options: &SearchOptions) -> f32 {
        let mut boosted = score;
        for (field, factor) in &options.boost {
            if let Some(value) = doc.get_field(field) {
                if value.as_text().to_lowercase().contains(&term.to_lowercase()) {
                    boosted *= factor;
                }
            }
        }
        boosted
    }

    fn matches_modifiers(doc: &Document, modifiers: &[(String, String)]) -> bool {
        modifiers.iter().all(|(field, value)| {
            doc.get_field(field).map(|v| v.as_text().to_lowercase().contains(&value.to_lowercase())).unwrap_or(false)
        })
    }

    /// Restricts hits to documents where at least one matched term actually occurs in
    /// one of the searched fields (`options.fields`, or every configured field).
    fn matches_fields(&self, doc: &Document, terms: &HashSet<String>, options: &SearchOptions) -> bool {
        let searched: &[String] = options.fields.as_deref().unwrap_or(&self.config.fields);
        searched.iter().any(|field| {
            doc.get_field(field)
                .map(|v| {
                    let text = v.as_text().to_lowercase();
                    terms.iter().any(|term| text.contains(term))
                })
                .unwrap_or(false)
        })
    }

    /// When `options.case_sensitive`, requires at least one matched term to occur in a
    /// searched field with the exact casing it was typed with. The trie itself is
    /// case-folded, so this is enforced as a post-filter against the stored document text.
    fn matches_case(&self, doc: &Document, terms: &HashSet<String>, processed: &ProcessedQuery, options: &SearchOptions) -> bool {
        if !options.case_sensitive {
            return true;
        }
        let searched: &[String] = options.fields.as_deref().unwrap_or(&self.config.fields);
        searched.iter().any(|field| {
            doc.get_field(field)
                .map(|v| {
                    let text = v.as_text();
                    terms.iter().any(|term| {
                        processed.case_terms.get(term).map(|raw| text.contains(raw.as_str())).unwrap_or(false)
                    })
                })
                .unwrap_or(false)
        })
    }

    /// Recomputes match highlight spans for a document's searched fields. For regex
    /// queries, the pattern runs globally on each matched term to find sub-spans within
    /// it (§4.5), which are then placed at every occurrence of that term in the field
    /// text; for plain-term queries, every case-insensitive occurrence of a matched term
    /// is highlighted in full.
    fn compute_highlights(
        &self,
        doc: &Document,
        terms: &HashSet<String>,
        regex_pattern: Option<&str>,
        options: &SearchOptions,
    ) -> Vec<HighlightSpan> {
        let searched: &[String] = options.fields.as_deref().unwrap_or(&self.config.fields);
        let mut spans = Vec::new();

        if let Some(pattern) = regex_pattern {
            let Ok(re) = Regex::new(pattern) else { return spans };
            for field in searched {
                let Some(value) = doc.get_field(field) else { continue };
                let text = value.as_text();
                let lower = text.to_lowercase();
                for term in terms {
                    if term.is_empty() {
                        continue;
                    }
                    // Positions within the matched term itself, per §4.5, guarding against
                    // a pattern like `.*` producing an infinite run of zero-length matches.
                    let mut rel_spans = Vec::new();
                    let mut last_end = None;
                    for m in re.find_iter(term) {
                        if m.start() == m.end() && Some(m.start()) == last_end {
                            continue;
                        }
                        rel_spans.push((m.start(), m.end()));
                        last_end = Some(m.end());
                    }
                    if rel_spans.is_empty() {
                        continue;
                    }
                    let mut cursor = 0;
                    while let Some(pos) = lower[cursor..].find(term.as_str()) {
                        let word_start = cursor + pos;
                        for (rel_start, rel_end) in &rel_spans {
                            spans.push(HighlightSpan {
                                field: field.clone(),
                                start: word_start + rel_start,
                                end: word_start + rel_end,
                            });
                        }
                        cursor = word_start + term.len();
                    }
                }
            }
            return spans;
        }

        for field in searched {
            let Some(value) = doc.get_field(field) else { continue };
            let text = value.as_text();
            let lower = text.to_lowercase();
            for term in terms {
                if term.is_empty() {
                    continue;
                }
                let mut cursor = 0;
                while let Some(pos) = lower[cursor..].find(term.as_str()) {
                    let start = cursor + pos;
                    let end = start + term.len();
                    spans.push(HighlightSpan { field: field.clone(), start, end });
                    cursor = end;
                }
            }
        }
        spans
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults> {
        let started = Instant::now();
        self.events.emit(EngineEvent::SearchStart { query: query.to_string() });

        if query.trim().is_empty() {
            self.events.emit(EngineEvent::SearchComplete { query: query.to_string(), result_count: 0 });
            return Ok(SearchResults::default());
        }

        let processed = process_query(query, options.case_sensitive);
        let has_content = options.regex.is_some()
            || !processed.terms.is_empty()
            || !processed.phrases.is_empty()
            || !processed.operators.is_empty();
        if !has_content {
            self.events.emit(EngineEvent::SearchComplete { query: query.to_string(), result_count: 0 });
            return Ok(SearchResults::default());
        }

        let cache_key = QueryKey::new(self.config.name.clone(), query.to_string(), fingerprint(options));
        if let Some(cached) = self.cache.get(&cache_key) {
            self.events.emit(EngineEvent::SearchComplete { query: query.to_string(), result_count: cached.hits.len() });
            return Ok(cached);
        }

        let trie = self.trie.read();
        let documents = self.documents.read();
        let corpus = CorpusStats { total_documents: documents.len() };

        struct Accum {
            score: f32,
            terms: HashSet<String>,
            edit_distance: Option<usize>,
        }
        let mut accum: HashMap<DocId, Accum> = HashMap::new();

        let gather: Vec<TrieHit> = if let Some(pattern) = &options.regex {
            regex_search::search(&trie, pattern, &options.regex_config)
                .into_iter()
                .map(|h| TrieHit { doc_id: h.doc_id, term: h.term, edit_distance: None })
                .collect()
        } else {
            let mut all_terms = processed.terms.clone();
            for phrase in &processed.phrases {
                all_terms.extend(phrase.split_whitespace().map(|s| s.to_lowercase()));
            }
            all_terms.into_iter().flat_map(|term| self.raw_hits(&trie, &term, options)).collect()
        };

        for hit in &gather {
            let node = trie.node_at(&hit.term);
            let base = node.map(|n| self.scorer.score_hit(n, &hit.term, corpus, hit.edit_distance)).unwrap_or(0.0);
            let entry = accum.entry(hit.doc_id.clone()).or_insert(Accum { score: 0.0, terms: HashSet::new(), edit_distance: None });
            entry.score += base;
            entry.terms.insert(hit.term.clone());
            entry.edit_distance = match (entry.edit_distance, hit.edit_distance) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (None, Some(b)) => Some(b),
                (existing, None) => existing,
            };
        }

        for (op, term) in &processed.operators {
            match op {
                Operator::Require => {
                    let required = Self::doc_ids(&trie.exact_search(term));
                    accum.retain(|id, _| required.contains(id));
                }
                Operator::Exclude | Operator::Negate => {
                    let excluded = Self::doc_ids(&trie.exact_search(term));
                    accum.retain(|id, _| !excluded.contains(id));
                }
            }
        }
        drop(trie);

        let mut hits = Vec::new();
        for (doc_id, entry) in accum {
            let Some(document) = documents.get(&doc_id) else { continue };
            if !Self::matches_modifiers(document, &processed.modifiers) {
                continue;
            }
            if !self.matches_fields(document, &entry.terms, options) {
                continue;
            }
            if !self.matches_case(document, &entry.terms, &processed, options) {
                continue;
            }
            let mut score = entry.score;
            for term in &entry.terms {
                score = self.apply_boost(score, term, document, options);
            }
            let threshold = options.threshold.max(options.min_score);
            if score < threshold {
                continue;
            }
            let highlights = if options.include_matches {
                self.compute_highlights(document, &entry.terms, options.regex.as_deref(), options)
            } else {
                Vec::new()
            };
            hits.push(SearchResult {
                doc_id: doc_id.clone(),
                score,
                document: if options.include_matches { Some(document.clone()) } else { None },
                matched_terms: entry.terms.into_iter().collect(),
                edit_distance: entry.edit_distance,
                highlights,
            });
        }
        drop(documents);

        let total_hits = hits.len();
        let mut collector = TopKCollector::new(options.max_results.max(1));
        for hit in hits {
            collector.collect(hit);
        }
        let mut ranked = collector.get_results();

        if let (Some(page), Some(page_size)) = (options.page, options.page_size) {
            let start = page.saturating_sub(1) * page_size;
            ranked = ranked.into_iter().skip(start).take(page_size).collect();
        }

        let max_score = ranked.iter().map(|h| h.score).fold(0.0_f32, f32::max);
        let took_ms = started.elapsed().as_millis() as u64;
        let results = SearchResults { hits: ranked, total_hits, max_score, took_ms };

        self.cache.set(cache_key, results.clone());
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.total_query_latency_ms.fetch_add(took_ms, Ordering::Relaxed);
        self.events.emit(EngineEvent::SearchComplete { query: query.to_string(), result_count: results.hits.len() });
        Ok(results)
    }

    pub fn stats(&self) -> EngineStats {
        let uptime_secs = self.start_instant.elapsed().as_secs();
        let queries = self.total_queries.load(Ordering::Relaxed);
        let latency_total = self.total_query_latency_ms.load(Ordering::Relaxed);
        EngineStats {
            uptime_secs,
            start_time: self.start_time,
            total_documents: self.documents.read().len(),
            trie_node_count: self.trie.read().node_count(),
            cache_stats: self.cache.stats(),
            queries_per_second: if uptime_secs > 0 { queries as f64 / uptime_secs as f64 } else { 0.0 },
            avg_query_latency_ms: if queries > 0 { latency_total as f64 / queries as f64 } else { 0.0 },
            writes_total: self.writes_total.load(Ordering::Relaxed),
            last_save_time: None,
        }
    }

    pub fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let trie_check = HealthCheck {
            name: "trie".to_string(),
            status: HealthStatus::Healthy,
            message: Some(format!("{} nodes", self.trie.read().node_count())),
            latency_ms: started.elapsed().as_millis() as u64,
        };

        let cache_started = Instant::now();
        let cache_stats = self.cache.stats();
        let cache_status = if cache_stats.size > cache_stats.capacity {
            HealthStatus::Degraded("cache over capacity".to_string())
        } else {
            HealthStatus::Healthy
        };
        let cache_check = HealthCheck {
            name: "cache".to_string(),
            status: cache_status,
            message: Some(format!("hit_rate={:.2}", cache_stats.hit_rate())),
            latency_ms: cache_started.elapsed().as_millis() as u64,
        };

        HealthCheckResult::from_checks(vec![trie_check, cache_check])
    }

    pub fn close(&self) -> Result<()> {
        self.incremental.close()?;
        self.events.emit(EngineEvent::Closed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FieldValue;

    fn engine() -> SearchEngine {
        let config = SearchEngineConfig::new("docs", vec!["content".into()]);
        SearchEngine::new(config).unwrap()
    }

    fn doc(id: &str, content: &str) -> Document {
        Document::new(DocId::new(id)).with_field("content", FieldValue::Text(content.to_string()))
    }

    #[test]
    fn add_then_search_finds_document() {
        let engine = engine();
        engine.add_document(doc("d1", "rust programming language")).unwrap();
        let results = engine.search("programming", &SearchOptions::default()).unwrap();
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].doc_id, DocId::new("d1"));
    }

    #[test]
    fn remove_document_drops_it_from_search() {
        let engine = engine();
        engine.add_document(doc("d1", "searchable content")).unwrap();
        engine.remove_document(&DocId::new("d1")).unwrap();
        let results = engine.search("searchable", &SearchOptions::default()).unwrap();
        assert!(results.hits.is_empty());
    }

    #[test]
    fn exclude_operator_filters_out_matching_documents() {
        let engine = engine();
        engine.add_document(doc("d1", "apple banana")).unwrap();
        engine.add_document(doc("d2", "apple cherry")).unwrap();
        let results = engine.search("apple -cherry", &SearchOptions::default()).unwrap();
        let ids: Vec<_> = results.hits.iter().map(|h| h.doc_id.clone()).collect();
        assert!(ids.contains(&DocId::new("d1")));
        assert!(!ids.contains(&DocId::new("d2")));
    }

    #[test]
    fn repeated_identical_search_hits_cache() {
        let engine = engine();
        engine.add_document(doc("d1", "cached query result")).unwrap();
        let first = engine.search("cached", &SearchOptions::default()).unwrap();
        let second = engine.search("cached", &SearchOptions::default()).unwrap();
        assert_eq!(first.hits.len(), second.hits.len());
        assert!(engine.stats().cache_stats.hits >= 1);
    }

    #[test]
    fn health_check_reports_healthy_for_fresh_engine() {
        let engine = engine();
        let health = engine.health_check();
        assert!(health.status.is_healthy());
    }

    #[test]
    fn empty_query_returns_empty_without_touching_cache() {
        let engine = engine();
        engine.add_document(doc("d1", "rust programming language")).unwrap();
        let before = engine.stats().cache_stats;
        let results = engine.search("   ", &SearchOptions::default()).unwrap();
        assert!(results.hits.is_empty());
        let after = engine.stats().cache_stats;
        assert_eq!(before.hits, after.hits);
        assert_eq!(before.misses, after.misses);
        assert_eq!(after.size, 0);
    }

    #[test]
    fn stop_word_only_query_returns_empty_and_does_not_populate_cache() {
        let engine = engine();
        engine.add_document(doc("d1", "rust programming language")).unwrap();
        let results = engine.search("the a an", &SearchOptions::default()).unwrap();
        assert!(results.hits.is_empty());
        assert_eq!(engine.stats().cache_stats.size, 0);
    }

    #[test]
    fn case_sensitive_search_does_not_match_differently_cased_term() {
        let engine = engine();
        engine.add_document(doc("d4", "a quiet hello from the team")).unwrap();
        let options = SearchOptions { case_sensitive: true, ..SearchOptions::default() };
        let results = engine.search("HELLO", &options).unwrap();
        assert!(results.hits.is_empty());

        let exact_case = engine.search("hello", &options).unwrap();
        assert_eq!(exact_case.hits.len(), 1);
    }

    #[test]
    fn include_matches_computes_highlight_spans_for_term_search() {
        let engine = engine();
        engine.add_document(doc("d1", "rust programming language")).unwrap();
        let options = SearchOptions { include_matches: true, ..SearchOptions::default() };
        let results = engine.search("programming", &options).unwrap();
        assert_eq!(results.hits.len(), 1);
        let highlights = &results.hits[0].highlights;
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].field, "content");
        // The matched term is stemmed ("programming" -> "program"), so the highlight
        // covers only that substring of the indexed word, not the whole word.
        assert_eq!(highlights[0].start, 5);
        assert_eq!(highlights[0].end, 12);
    }

    #[test]
    fn include_matches_computes_highlight_spans_for_regex_search() {
        let engine = engine();
        engine.add_document(doc("d1", "cat car dog")).unwrap();
        let options = SearchOptions { include_matches: true, regex: Some("^ca.$".to_string()), ..SearchOptions::default() };
        let results = engine.search("ignored", &options).unwrap();
        assert_eq!(results.hits.len(), 1);
        let highlights = &results.hits[0].highlights;
        assert_eq!(highlights.len(), 2);
    }

    #[test]
    fn update_document_pushes_prior_content_to_version_history() {
        let config = SearchEngineConfig::new("docs", vec!["content".into()]).with_versioning(3);
        let engine = SearchEngine::new(config).unwrap();
        engine.add_document(doc("d1", "first draft")).unwrap();
        engine.update_document(doc("d1", "second draft")).unwrap();

        let results = engine.search("second", &SearchOptions::default()).unwrap();
        assert_eq!(results.hits.len(), 1);
        let stored = results.hits[0].document.as_ref().unwrap();
        assert_eq!(stored.versions.len(), 1);
        assert_eq!(stored.versions[0].content, "first draft");
    }
}
