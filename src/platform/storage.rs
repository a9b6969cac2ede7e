// DevGate - platform/storage.rs
//
// Persisted key-value storage for the developer identity.
//
// The store is a best-effort cache, never a source of truth:
// - A missing or corrupt file reads as "no value".
// - Writes are atomic (write→temp, rename→final) so a crash during a write
//   never corrupts the previous good file.
// - The data directory is created on first write.

use crate::platform::config::PlatformPaths;
use crate::util::constants::{MAX_STORAGE_FILE_SIZE, STORAGE_FILE_NAME};
use crate::util::error::StorageError;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String key-value storage consulted by the identity resolver.
pub trait KeyValueStore: Send + Sync {
    /// Read `key`. `Ok(None)` when the key (or the whole store) is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// File-backed store
// =============================================================================

/// JSON object file holding string values, one file per user and scope.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Probe for the platform data directory and open the store for
    /// `scope` there (`<data_dir>/<scope>/storage.json`).
    ///
    /// Returns `None` when the platform directories cannot be determined,
    /// which callers treat as "storage capability absent".
    pub fn detect(scope: &str) -> Option<Self> {
        let paths = PlatformPaths::detect()?;
        Some(Self::new(
            paths.data_dir.join(scope).join(STORAGE_FILE_NAME),
        ))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.len() > MAX_STORAGE_FILE_SIZE => {
                return Err(StorageError::FileTooLarge {
                    path: self.path.clone(),
                    size: meta.len(),
                    max_size: MAX_STORAGE_FILE_SIZE,
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    operation: "stat",
                    source: e,
                })
            }
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| StorageError::Io {
            path: self.path.clone(),
            operation: "read",
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| StorageError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(map).map_err(|e| StorageError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes()).map_err(|e| StorageError::Io {
            path: tmp.clone(),
            operation: "write",
            source: e,
        })?;

        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StorageError::Io {
                path: self.path.clone(),
                operation: "rename",
                source: e,
            }
        })?;

        tracing::debug!(path = %self.path.display(), "Storage file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        // A corrupt file is replaced rather than blocking every future write.
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding unreadable storage file");
                BTreeMap::new()
            }
        };
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        match self.read_map() {
            Ok(mut map) => {
                if map.remove(key).is_none() {
                    return Ok(());
                }
                self.write_map(&map)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Discarding unreadable storage file");
                self.write_map(&BTreeMap::new())
            }
        }
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store. Values vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit tests
// =============================================================================
