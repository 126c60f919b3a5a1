use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Document;
use crate::trie::SerializedTrie;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub key: String,
    pub value: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfigSnapshot {
    pub version: u32,
    pub fields: Vec<String>,
}

/// Self-describing, JSON-shaped persisted form of one named index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedIndex {
    pub documents: Vec<DocumentEntry>,
    pub index_state: SerializedTrie,
    pub config: IndexConfigSnapshot,
}

/// Mandatory capability every storage backend must implement: store and retrieve a
/// whole named index plus its configuration snapshot.
pub trait StorageAdapter: Send + Sync {
    fn initialize(&self) -> Result<()>;
    fn store_index(&self, name: &str, index: &SerializedIndex) -> Result<()>;
    fn get_index(&self, name: &str) -> Result<Option<SerializedIndex>>;
    fn update_metadata(&self, name: &str, config: &IndexConfigSnapshot) -> Result<()>;
    fn get_metadata(&self, name: &str) -> Result<Option<IndexConfigSnapshot>>;
    fn remove_index(&self, name: &str) -> Result<()>;
    fn clear_indices(&self) -> Result<()>;
    fn has_index(&self, name: &str) -> Result<bool>;
    fn list_indices(&self) -> Result<Vec<String>>;
    fn close(&self) -> Result<()>;
}

/// Optional capability for backends that can also serve as a flat key-value store,
/// used to back the result cache persistently. Probed separately from `StorageAdapter`
/// since not every backend supports it.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}
