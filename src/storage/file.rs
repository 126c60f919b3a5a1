use std::fs;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;

use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::adapter::{IndexConfigSnapshot, KeyValueStore, SerializedIndex, StorageAdapter};

/// One JSON file per index plus a companion metadata file, guarded against partial
/// writes by a leading CRC32 checksum line.
pub struct FileSystemStorageAdapter {
    base_dir: PathBuf,
}

impl FileSystemStorageAdapter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FileSystemStorageAdapter { base_dir: base_dir.into() }
    }

    fn index_path(&self, name: &str) -> PathBuf {
        self.base_dir.join("indices").join(format!("{name}.json"))
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.base_dir.join("meta").join(format!("{name}.json"))
    }

    fn kv_dir(&self) -> PathBuf {
        self.base_dir.join("kv")
    }

    fn write_checked(path: &Path, payload: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut hasher = Hasher::new();
        hasher.update(payload);
        let checksum = hasher.finalize();
        let mut framed = checksum.to_le_bytes().to_vec();
        framed.extend_from_slice(payload);
        fs::write(path, framed)?;
        Ok(())
    }

    fn read_checked(path: &Path) -> Result<Option<Vec<u8>>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read(path)?;
        if raw.len() < 4 {
            return Err(Error::new(ErrorKind::Storage, "truncated file: missing checksum header"));
        }
        let (header, payload) = raw.split_at(4);
        let expected = u32::from_le_bytes(header.try_into().unwrap());
        let mut hasher = Hasher::new();
        hasher.update(payload);
        if hasher.finalize() != expected {
            return Err(Error::new(ErrorKind::Storage, "checksum mismatch: partial or corrupted write"));
        }
        Ok(Some(payload.to_vec()))
    }
}

impl StorageAdapter for FileSystemStorageAdapter {
    fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.base_dir.join("indices"))?;
        fs::create_dir_all(self.base_dir.join("meta"))?;
        fs::create_dir_all(self.kv_dir())?;
        Ok(())
    }

    fn store_index(&self, name: &str, index: &SerializedIndex) -> Result<()> {
        let payload = serde_json::to_vec(index)?;
        Self::write_checked(&self.index_path(name), &payload)?;
        self.update_metadata(name, &index.config)
    }

    fn get_index(&self, name: &str) -> Result<Option<SerializedIndex>> {
        match Self::read_checked(&self.index_path(name))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn update_metadata(&self, name: &str, config: &IndexConfigSnapshot) -> Result<()> {
        let payload = serde_json::to_vec(config)?;
        Self::write_checked(&self.meta_path(name), &payload)
    }

    fn get_metadata(&self, name: &str) -> Result<Option<IndexConfigSnapshot>> {
        match Self::read_checked(&self.meta_path(name))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn remove_index(&self, name: &str) -> Result<()> {
        let _ = fs::remove_file(self.index_path(name));
        let _ = fs::remove_file(self.meta_path(name));
        Ok(())
    }

    fn clear_indices(&self) -> Result<()> {
        let _ = fs::remove_dir_all(self.base_dir.join("indices"));
        let _ = fs::remove_dir_all(self.base_dir.join("meta"));
        fs::create_dir_all(self.base_dir.join("indices"))?;
        fs::create_dir_all(self.base_dir.join("meta"))?;
        Ok(())
    }

    fn has_index(&self, name: &str) -> Result<bool> {
        Ok(self.index_path(name).exists())
    }

    fn list_indices(&self) -> Result<Vec<String>> {
        let dir = self.base_dir.join("indices");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        Ok(names)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl KeyValueStore for FileSystemStorageAdapter {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Self::read_checked(&self.kv_dir().join(key))
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        Self::write_checked(&self.kv_dir().join(key), &value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _ = fs::remove_file(self.kv_dir().join(key));
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.kv_dir().exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(self.kv_dir())? {
            let entry = entry?;
            if let Some(name) = entry.path().file_name().and_then(|s| s.to_str()) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::Trie;
    use tempfile::tempdir;

    fn sample_index() -> SerializedIndex {
        SerializedIndex {
            documents: vec![],
            index_state: Trie::new().to_serialized(),
            config: IndexConfigSnapshot { version: 1, fields: vec!["content".into()] },
        }
    }

    #[test]
    fn store_then_get_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let adapter = FileSystemStorageAdapter::new(dir.path());
        adapter.initialize().unwrap();
        adapter.store_index("corpus", &sample_index()).unwrap();
        let loaded = adapter.get_index("corpus").unwrap();
        assert!(loaded.is_some());
    }

    #[test]
    fn corrupted_file_surfaces_checksum_error() {
        let dir = tempdir().unwrap();
        let adapter = FileSystemStorageAdapter::new(dir.path());
        adapter.initialize().unwrap();
        adapter.store_index("corpus", &sample_index()).unwrap();
        let path = adapter.index_path("corpus");
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();
        assert!(adapter.get_index("corpus").is_err());
    }

    #[test]
    fn list_indices_reflects_stored_names() {
        let dir = tempdir().unwrap();
        let adapter = FileSystemStorageAdapter::new(dir.path());
        adapter.initialize().unwrap();
        adapter.store_index("a", &sample_index()).unwrap();
        adapter.store_index("b", &sample_index()).unwrap();
        let mut names = adapter.list_indices().unwrap();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
