//! File-backed storage
//!
//! Persists the whole key-value map as one JSON document. Every mutation
//! rewrites the document through a temporary file and a rename.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{Result, VaultError};
use crate::storage::StorageBackend;

/// JSON document store that survives process restarts.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts an empty store. An unreadable or malformed file
    /// is an error rather than silently discarding stored credentials.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                VaultError::BackingStore(format!("malformed store {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(e)),
        };

        debug!("Opened file storage at {} ({} entries)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Returns the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| VaultError::BackingStore(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp).map_err(io_error)?;
        // The mode only applies on creation; a leftover temp file keeps its own.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600)).map_err(io_error)?;
        }
        file.write_all(json.as_bytes()).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(io_error)
    }

    /// Applies `mutate` to a copy of the map and commits it only if the
    /// document was written.
    fn mutate<T>(&self, mutate: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let mut next = entries.clone();
        let out = mutate(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(out)
    }
}

fn io_error(e: std::io::Error) -> VaultError {
    VaultError::BackingStore(e.to_string())
}

fn poisoned() -> VaultError {
    VaultError::BackingStore("storage lock poisoned".to_string())
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<bool> {
        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            if !entries.contains_key(key) {
                return Ok(false);
            }
        }
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn remove_many(&self, keys: &[String]) -> Result<usize> {
        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            if !keys.iter().any(|key| entries.contains_key(key)) {
                return Ok(0);
            }
        }
        self.mutate(|entries| keys.iter().filter(|key| entries.remove(*key).is_some()).count())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    fn is_available(&self) -> bool {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
            _ => true,
        }
    }
}
