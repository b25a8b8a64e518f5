use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

/// Default store capacity, matching the usual browser local-storage quota.
pub const DEFAULT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage quota exceeded: {needed} bytes needed, capacity is {capacity}")]
    QuotaExceeded { needed: usize, capacity: usize },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Synchronous string key/value store with a capacity limit.
///
/// Implementations lock internally so a single store can be shared between
/// the UI loop and background fetch tasks.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or overwrite. Fails without modifying the store if the write
    /// would exceed capacity.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str);

    /// Remove every key matching `predicate` in one operation.
    /// Returns how many keys were removed.
    fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> usize;

    fn keys(&self) -> Vec<String>;
}

/// Bytes a store would hold after writing `key = value`.
fn size_after_write(entries: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
    let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
    current - replaced + key.len() + value.len()
}

fn check_quota(
    entries: &HashMap<String, String>,
    key: &str,
    value: &str,
    capacity: usize,
) -> Result<(), StoreError> {
    let needed = size_after_write(entries, key, value);
    if needed > capacity {
        return Err(StoreError::QuotaExceeded { needed, capacity });
    }
    Ok(())
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY_BYTES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        check_quota(&entries, key, value, self.capacity)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|k, _| !predicate(k));
        before - entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// A key/value map persisted as one JSON object file.
///
/// Every mutation rewrites the file. A write that cannot be persisted is
/// rolled back in memory so the map always mirrors disk.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    capacity: usize,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    /// An unreadable or corrupt file is logged and replaced by an empty store.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = Self::load(&path);
        debug!(path = %path.display(), entries = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            capacity,
        })
    }

    fn load(path: &Path) -> HashMap<String, String> {
        if !path.exists() {
            return HashMap::new();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read store file, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse store file, starting empty");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_string(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        check_quota(&entries, key, value, self.capacity)?;

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.persist(&entries) {
                warn!(key = key, error = %e, "Failed to persist store after removal");
                entries.insert(key.to_string(), old);
            }
        }
    }

    fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> usize {
        let mut entries = self.entries.lock();
        let keys: Vec<String> = entries.keys().filter(|k| predicate(k.as_str())).cloned().collect();
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|k| entries.remove_entry(k))
            .collect();

        if removed.is_empty() {
            return 0;
        }
        if let Err(e) = self.persist(&entries) {
            warn!(count = removed.len(), error = %e, "Failed to persist store after bulk removal");
            entries.extend(removed);
            return 0;
        }
        removed.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}
