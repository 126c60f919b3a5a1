pub mod analysis;
pub mod cache;
pub mod core;
pub mod engine;
pub mod incremental;
pub mod processors;
pub mod scoring;
pub mod search;
pub mod storage;
pub mod trie;

pub use core::config::{SearchEngineConfig, SearchOptions};
pub use core::error::{Error, ErrorKind, Result};
pub use core::types::{DocId, Document, FieldValue};
pub use engine::SearchEngine;
pub use search::results::{SearchResult, SearchResults};

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                              TRIEVE SEARCH ARCHITECTURE                                      │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── ENGINE LAYER ─────────────────────────────────────────┐
│                                                                                               │
│  ┌───────────────────────────────────────────────────────────────────────────────────┐     │
│  │                             struct SearchEngine                                     │     │
│  │  ┌─────────────────────────────────────────────────────────────────────────────┐  │     │
│  │  │ config: SearchEngineConfig                                                  │  │     │
│  │  │ trie: Arc<RwLock<Trie>>              // term index, one writer at a time   │  │     │
│  │  │ documents: Arc<RwLock<HashMap<DocId, Document>>>                           │  │     │
│  │  │ cache: CacheManager                  // TTL + LRU/MRU result cache         │  │     │
│  │  │ incremental: IncrementalIndexManager // batches + auto-saves               │  │     │
│  │  │ events: SharedEventEmitter           // engine:*, index:*, search:* events  │  │     │
│  │  │ analyzer: Analyzer                   // tokenize -> lowercase -> stopwords  │  │     │
│  │  │                                         -> suffix stripping                 │  │     │
│  │  │ scorer: TrieScorer                                                          │  │     │
│  │  └─────────────────────────────────────────────────────────────────────────────┘  │     │
│  └───────────────────────────────────────────────────────────────────────────────────┘     │
└───────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── TRIE LAYER ────────────────────────────────────────────┐
│                                                                                               │
│  ┌────────────────────────┐  ┌──────────────────────┐  ┌───────────────────────────┐       │
│  │ struct Trie            │  │ struct TrieNode      │  │ struct TrieHit            │       │
│  │ • root: TrieNode       │  │ • children: HashMap  │  │ • doc_id: DocId           │       │
│  │ • max_word_length      │  │ • document_refs: Set │  │ • term: String            │       │
│  │ • total_documents      │  │ • weight, frequency  │  │ • edit_distance: Option   │       │
│  │ exact/prefix/fuzzy/    │  │ • depth, prefix_count│  └───────────────────────────┘       │
│  │ suggestions/serialize  │  │ • last_accessed      │                                       │
│  └────────────────────────┘  └──────────────────────┘                                       │
└───────────────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── QUERY LAYER ─────────────────────────────────────────────┐
│                                                                                               │
│  ┌─────────────────────────┐  ┌──────────────────────┐  ┌────────────────────────┐          │
│  │ fn process_query        │  │ struct ProcessedQuery│  │ fn regex_search::search│          │
│  │ • nom-based phrase       │  │ • phrases, terms     │  │ • BFS (simple) /       │          │
│  │   extraction             │  │ • operators          │  │   DFS (complex)        │          │
│  │ • stop word removal      │  │ • modifiers          │  │   dispatch by pattern  │          │
│  │ • suffix stripping       │  └──────────────────────┘  │   complexity heuristic│          │
│  └─────────────────────────┘                             └────────────────────────┘          │
└───────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── STORAGE LAYER ────────────────────────────────────────────┐
│                                                                                               │
│  ┌────────────────────────┐  ┌──────────────────────┐  ┌───────────────────────┐            │
│  │ trait StorageAdapter   │  │ trait KeyValueStore  │  │ struct PersistenceMgr │            │
│  │ • whole-index store    │  │ • flat byte store    │  │ • wraps one adapter   │            │
│  │ InMemory / FileSystem  │  │ InMemory / FileSystem│  │ • auto-fallback       │            │
│  │   (crc32-checked)      │  │                      │  │ • blob cache          │            │
│  └────────────────────────┘  └──────────────────────┘  └───────────────────────┘            │
└───────────────────────────────────────────────────────────────────────────────────────────────┘

│  CacheManager ──wraps──> lru::LruCache<QueryKey, CacheEntry> ──evicts-by──> TTL / LRU / MRU   │
│  IncrementalIndexManager ──owns──> Trie, Documents ──saves-via──> PersistenceManager          │
│  SearchEngine ──emits──> EngineEvent ──through──> EventEmitter (panic-safe listeners)          │
*/
