//! Storage Module
//!
//! Synchronous string key-value backends the vault persists records into.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

// == Storage Backend ==
/// A persistent, synchronous string key-value store.
///
/// Backends are shared between tasks, so implementations lock internally.
/// Every failure is reported as [`crate::error::VaultError::BackingStore`].
pub trait StorageBackend: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Returns whether an entry existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Removes every key in `keys`. Returns how many entries existed.
    fn remove_many(&self, keys: &[String]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            if self.remove(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Lists every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    /// Reports whether the backend can be used at all.
    fn is_available(&self) -> bool {
        true
    }
}
