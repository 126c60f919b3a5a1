use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::error::Result;
use crate::storage::adapter::{IndexConfigSnapshot, KeyValueStore, SerializedIndex, StorageAdapter};

/// Process-local storage backend. Guarded by a lock since the owning engine may be
/// shared across threads even though a single logical writer mutates it at a time.
#[derive(Default)]
pub struct InMemoryStorageAdapter {
    indices: RwLock<HashMap<String, SerializedIndex>>,
    metadata: RwLock<HashMap<String, IndexConfigSnapshot>>,
    kv: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for InMemoryStorageAdapter {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn store_index(&self, name: &str, index: &SerializedIndex) -> Result<()> {
        self.indices.write().insert(name.to_string(), index.clone());
        self.metadata.write().insert(name.to_string(), index.config.clone());
        Ok(())
    }

    fn get_index(&self, name: &str) -> Result<Option<SerializedIndex>> {
        Ok(self.indices.read().get(name).cloned())
    }

    fn update_metadata(&self, name: &str, config: &IndexConfigSnapshot) -> Result<()> {
        self.metadata.write().insert(name.to_string(), config.clone());
        Ok(())
    }

    fn get_metadata(&self, name: &str) -> Result<Option<IndexConfigSnapshot>> {
        Ok(self.metadata.read().get(name).cloned())
    }

    fn remove_index(&self, name: &str) -> Result<()> {
        self.indices.write().remove(name);
        self.metadata.write().remove(name);
        Ok(())
    }

    fn clear_indices(&self) -> Result<()> {
        self.indices.write().clear();
        self.metadata.write().clear();
        Ok(())
    }

    fn has_index(&self, name: &str) -> Result<bool> {
        Ok(self.indices.read().contains_key(name))
    }

    fn list_indices(&self) -> Result<Vec<String>> {
        Ok(self.indices.read().keys().cloned().collect())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl KeyValueStore for InMemoryStorageAdapter {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.kv.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.kv.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.kv.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.kv.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::Trie;

    fn sample_index() -> SerializedIndex {
        SerializedIndex {
            documents: vec![],
            index_state: Trie::new().to_serialized(),
            config: IndexConfigSnapshot { version: 1, fields: vec!["content".into()] },
        }
    }

    #[test]
    fn store_then_get_round_trips() {
        let adapter = InMemoryStorageAdapter::new();
        adapter.store_index("corpus", &sample_index()).unwrap();
        assert!(adapter.has_index("corpus").unwrap());
        assert!(adapter.get_index("corpus").unwrap().is_some());
    }

    #[test]
    fn remove_index_clears_metadata_too() {
        let adapter = InMemoryStorageAdapter::new();
        adapter.store_index("corpus", &sample_index()).unwrap();
        adapter.remove_index("corpus").unwrap();
        assert!(adapter.get_metadata("corpus").unwrap().is_none());
    }

    #[test]
    fn key_value_store_roundtrip() {
        let adapter = InMemoryStorageAdapter::new();
        adapter.set("k", vec![1, 2, 3]).unwrap();
        assert_eq!(adapter.get("k").unwrap(), Some(vec![1, 2, 3]));
        adapter.remove("k").unwrap();
        assert_eq!(adapter.get("k").unwrap(), None);
    }
}
