use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::config::{StorageConfig, StorageKind};
use crate::core::error::Result;
use crate::storage::adapter::{IndexConfigSnapshot, SerializedIndex, StorageAdapter};
use crate::storage::file::FileSystemStorageAdapter;
use crate::storage::memory::InMemoryStorageAdapter;

/// Wraps one storage adapter. Falls back to an in-memory adapter if the configured
/// backend fails to initialize and `auto_fallback` is enabled; otherwise surfaces the
/// error. Keeps a small read-through cache of serialized index blobs so repeated loads
/// within a session avoid adapter I/O.
pub struct PersistenceManager {
    adapter: Arc<dyn StorageAdapter>,
    blob_cache: RwLock<Option<(String, SerializedIndex)>>,
}

impl PersistenceManager {
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let primary: Arc<dyn StorageAdapter> = match &config.kind {
            StorageKind::Memory => Arc::new(InMemoryStorageAdapter::new()),
            StorageKind::FileSystem { base_dir } => Arc::new(FileSystemStorageAdapter::new(base_dir.clone())),
        };

        let adapter = match primary.initialize() {
            Ok(()) => primary,
            Err(e) if config.auto_fallback => {
                tracing::warn!(error = %e, "storage initialization failed, falling back to in-memory adapter");
                let fallback: Arc<dyn StorageAdapter> = Arc::new(InMemoryStorageAdapter::new());
                fallback.initialize()?;
                fallback
            }
            Err(e) => return Err(e),
        };

        Ok(PersistenceManager { adapter, blob_cache: RwLock::new(None) })
    }

    pub fn store_index(&self, name: &str, index: &SerializedIndex) -> Result<()> {
        self.adapter.store_index(name, index)?;
        *self.blob_cache.write() = Some((name.to_string(), index.clone()));
        Ok(())
    }

    pub fn get_index(&self, name: &str) -> Result<Option<SerializedIndex>> {
        if let Some((cached_name, cached)) = self.blob_cache.read().as_ref() {
            if cached_name == name {
                return Ok(Some(cached.clone()));
            }
        }
        let loaded = self.adapter.get_index(name)?;
        if let Some(index) = &loaded {
            *self.blob_cache.write() = Some((name.to_string(), index.clone()));
        }
        Ok(loaded)
    }

    pub fn update_metadata(&self, name: &str, config: &IndexConfigSnapshot) -> Result<()> {
        self.adapter.update_metadata(name, config)
    }

    pub fn remove_index(&self, name: &str) -> Result<()> {
        self.adapter.remove_index(name)?;
        let mut cache = self.blob_cache.write();
        if cache.as_ref().map(|(n, _)| n == name).unwrap_or(false) {
            *cache = None;
        }
        Ok(())
    }

    pub fn has_index(&self, name: &str) -> Result<bool> {
        self.adapter.has_index(name)
    }

    pub fn close(&self) -> Result<()> {
        self.adapter.close()
    }
}
