use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageKind {
    Memory,
    FileSystem { base_dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub auto_fallback: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            kind: StorageKind::Memory,
            auto_fallback: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersioningConfig {
    pub enabled: bool,
    pub max_versions: usize,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig { enabled: false, max_versions: 10 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentSupportConfig {
    pub enabled: bool,
    pub versioning: VersioningConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    Lru,
    Mru,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_size: usize,
    pub ttl_ms: u64,
    pub strategy: CacheStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_size: 1000,
            ttl_ms: 5 * 60 * 1000,
            strategy: CacheStrategy::Lru,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegexConfig {
    pub max_depth: usize,
    pub timeout_ms: u64,
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl Default for RegexConfig {
    fn default() -> Self {
        RegexConfig {
            max_depth: 50,
            timeout_ms: 5000,
            case_sensitive: false,
            whole_word: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub fuzzy: bool,
    pub max_distance: u8,
    pub prefix_match: bool,
    pub regex: Option<String>,
    pub regex_config: RegexConfig,
    pub fields: Option<Vec<String>>,
    pub boost: HashMap<String, f32>,
    pub threshold: f32,
    pub min_score: f32,
    pub case_sensitive: bool,
    pub include_matches: bool,
    pub include_score: bool,
    pub max_results: usize,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            fuzzy: false,
            max_distance: 2,
            prefix_match: false,
            regex: None,
            regex_config: RegexConfig::default(),
            fields: None,
            boost: HashMap::new(),
            threshold: 0.0,
            min_score: 0.0,
            case_sensitive: false,
            include_matches: true,
            include_score: true,
            max_results: 10,
            page: None,
            page_size: None,
        }
    }
}

impl SearchOptions {
    pub fn with_fuzzy(mut self, max_distance: u8) -> Self {
        self.fuzzy = true;
        self.max_distance = max_distance;
        self
    }

    pub fn with_prefix_match(mut self) -> Self {
        self.prefix_match = true;
        self
    }

    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

#[derive(Debug, Clone)]
pub struct IncrementalConfig {
    pub auto_save_enabled: bool,
    pub auto_save_interval_ms: u64,
    pub auto_save_threshold: usize,
    pub batch_enabled: bool,
    pub batch_size: usize,
    pub batch_concurrency: usize,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        IncrementalConfig {
            auto_save_enabled: true,
            auto_save_interval_ms: 30_000,
            auto_save_threshold: 100,
            batch_enabled: true,
            batch_size: 100,
            batch_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchEngineConfig {
    pub name: String,
    pub version: u32,
    pub fields: Vec<String>,
    pub search_defaults: SearchOptions,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub document_support: DocumentSupportConfig,
    pub incremental: IncrementalConfig,
    pub max_word_length: usize,
}

impl SearchEngineConfig {
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        SearchEngineConfig {
            name: name.into(),
            version: 1,
            fields,
            search_defaults: SearchOptions::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            document_support: DocumentSupportConfig::default(),
            incremental: IncrementalConfig::default(),
            max_word_length: 50,
        }
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_versioning(mut self, max_versions: usize) -> Self {
        self.document_support.enabled = true;
        self.document_support.versioning = VersioningConfig { enabled: true, max_versions };
        self
    }
}
