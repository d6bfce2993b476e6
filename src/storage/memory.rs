//! In-memory storage backend
//!
//! Ephemeral store used when no storage path is configured, and by tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Result, VaultError};
use crate::storage::StorageBackend;

/// HashMap-backed store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    /// Maximum total bytes of keys plus values, None = unbounded
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once `bytes` would be exceeded.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Creates a store that reports itself unavailable and rejects every call.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn check_enabled(&self) -> Result<()> {
        if self.disabled {
            return Err(VaultError::BackingStore("storage is disabled".to_string()));
        }
        Ok(())
    }
}

fn poisoned() -> VaultError {
    VaultError::BackingStore("storage lock poisoned".to_string())
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_enabled()?;
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_enabled()?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(VaultError::BackingStore(format!(
                    "quota of {} bytes exceeded",
                    quota
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.check_enabled()?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_enabled()?;
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    fn is_available(&self) -> bool {
        !self.disabled
    }
}
