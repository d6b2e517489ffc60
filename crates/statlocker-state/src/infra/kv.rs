//! Key-Value Storage Adapters
//!
//! Storage backends for the state stores. Each store serializes its
//! aggregate as a JSON text blob under a namespaced key; the store layer,
//! not the adapter, owns the (de)serialization contract.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::PathBuf;

use statlocker_common::StorageError;

/// Trait for key-value storage backends
///
/// Mirrors the device storage surface the stores were written against:
/// string keys, string values, bulk removal, key enumeration.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under a key, `None` if absent
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value under a key, overwriting any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; absent keys are not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove several keys in one call
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// List all stored keys
    async fn get_all_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Build the storage key for a user-scoped aggregate:
/// `base + "_" + user_id` when a user id is present, else the bare base key.
pub fn scoped_key(base: &str, user_id: Option<&str>) -> String {
    match user_id {
        Some(uid) => format!("{}_{}", base, uid),
        None => base.to_string(),
    }
}

/// In-memory storage implementation
///
/// Uses DashMap for concurrent access. Default backend for tests and for
/// sessions that opt out of durable storage.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }
}

/// File-backed storage implementation
///
/// One file per key under a root directory, the on-device storage analog.
/// Values are written as-is (the stores already hand over JSON text).
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Create a file store rooted at `root`. The directory is created on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Restrict keys to file-name-safe characters. Keys in the StatLocker
/// namespace are already safe; this guards against path traversal from
/// caller-supplied user ids.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::read(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::write(key, e))?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| StorageError::write(key, e))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::write(key, e)),
        }
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::read("<root>", e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::read("<root>", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
