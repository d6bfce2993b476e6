//! Credential Vault Module
//!
//! Encrypts values into a storage backend with optional expiry, reads them
//! back through the strategy chain, and degrades to plaintext storage when
//! encryption is unavailable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::crypto::{self, CipherProvider, EncryptionKey, APP_SALT};
use crate::error::{Result, VaultError};
use crate::storage::StorageBackend;
use crate::vault::{
    KeyCell, Lookup, Namespace, ReadStrategy, StatsSnapshot, StoredRecord, VaultStats,
    WriteMode, MAX_KEY_LENGTH, MAX_VALUE_SIZE, READ_ORDER,
};

// == Vault Config ==
/// Tuning for a [`CredentialVault`].
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Prefix for every managed storage key
    pub namespace: String,
    /// Client identifier mixed into the key derivation passphrase
    pub client_id: String,
    /// PBKDF2 iteration count
    pub kdf_iterations: u32,
    /// Re-write plaintext hits into the encrypted namespace
    pub migrate_legacy: bool,
    /// Largest accepted value in bytes
    pub max_value_size: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            namespace: "credvault".to_string(),
            client_id: concat!("credvault/", env!("CARGO_PKG_VERSION")).to_string(),
            kdf_iterations: crypto::MIN_KDF_ITERATIONS,
            migrate_legacy: true,
            max_value_size: MAX_VALUE_SIZE,
        }
    }
}

/// Which halves of the runtime prerequisites are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportReport {
    pub storage: bool,
    pub encryption: bool,
}

// == Credential Vault ==
/// Encrypted key-value cache over a [`StorageBackend`].
///
/// One vault is built by the application and shared by reference; the
/// derived key lives in the vault, not in a global.
pub struct CredentialVault {
    storage: Arc<dyn StorageBackend>,
    cipher: Arc<dyn CipherProvider>,
    namespace: Namespace,
    passphrase: String,
    config: VaultConfig,
    key: KeyCell,
    stats: VaultStats,
    unsupported_reported: AtomicBool,
}

impl CredentialVault {
    // == Constructor ==
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        cipher: Arc<dyn CipherProvider>,
        config: VaultConfig,
    ) -> Self {
        Self {
            storage,
            cipher,
            namespace: Namespace::new(config.namespace.clone()),
            passphrase: crypto::local_passphrase(&config.client_id),
            config,
            key: KeyCell::new(),
            stats: VaultStats::new(),
            unsupported_reported: AtomicBool::new(false),
        }
    }

    // == Set Item ==
    /// Stores `value` under `key`, expiring after `ttl` when given.
    ///
    /// Falls back to a plaintext write if the key cannot be derived or the
    /// record cannot be encrypted. Only backend failures are returned.
    pub async fn set_item(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<WriteMode> {
        self.ensure_supported()?;
        self.validate_key(key)?;
        if value.len() > self.config.max_value_size {
            return Err(VaultError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                self.config.max_value_size
            )));
        }

        let record = StoredRecord::new(value, ttl);
        self.write_record(key, &record).await
    }

    // == Get Item ==
    /// Returns the value for `key`, or None when absent or expired.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.ensure_supported()?;
        self.validate_key(key)?;

        for strategy in READ_ORDER {
            match self.lookup(strategy, key).await? {
                Lookup::Hit(value) => {
                    debug!("Vault hit for '{}' via {:?}", key, strategy);
                    self.stats.record_hit();
                    return Ok(Some(value));
                }
                Lookup::Expired => {
                    debug!("Vault record for '{}' expired", key);
                    self.stats.record_expired();
                    return Ok(None);
                }
                Lookup::Miss => continue,
            }
        }

        self.stats.record_miss();
        Ok(None)
    }

    // == Remove Item ==
    /// Deletes every stored form of `key`. Removing a missing key is not an error.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_supported()?;
        self.validate_key(key)?;

        for strategy in READ_ORDER {
            self.storage.remove(&strategy.storage_key(&self.namespace, key))?;
        }
        Ok(())
    }

    // == Clear ==
    /// Deletes every entry under the managed prefix and returns how many
    /// were removed. Keys outside the prefix are left alone.
    pub fn clear(&self) -> Result<usize> {
        self.ensure_supported()?;

        let managed: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|storage_key| self.namespace.owns(storage_key))
            .collect();
        let removed = self.storage.remove_many(&managed)?;

        info!("Vault cleared: removed {} entries", removed);
        Ok(removed)
    }

    // == Support ==
    /// True when both storage and encryption are usable. Callers use this to
    /// warn about reduced security; the vault works without encryption.
    pub fn is_supported(&self) -> bool {
        let report = self.support();
        report.storage && report.encryption
    }

    pub fn support(&self) -> SupportReport {
        SupportReport {
            storage: self.storage.is_available(),
            encryption: self.cipher.is_available(),
        }
    }

    /// Derives the encryption key ahead of the first request.
    pub async fn warm_up(&self) -> Result<()> {
        self.encryption_key().await.map(|_| ())
    }

    pub fn key_ready(&self) -> bool {
        self.key.is_ready()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    // == Internals ==

    fn ensure_supported(&self) -> Result<()> {
        if self.storage.is_available() {
            return Ok(());
        }
        if !self.unsupported_reported.swap(true, Ordering::Relaxed) {
            warn!("Vault storage backend is unavailable; operations will fail");
        }
        Err(VaultError::UnsupportedEnvironment)
    }

    async fn encryption_key(&self) -> Result<Arc<EncryptionKey>> {
        if !self.cipher.is_available() {
            return Err(VaultError::EncryptionUnavailable(
                "cipher provider unavailable".to_string(),
            ));
        }

        self.key
            .get_or_derive(move || async move {
                self.stats.record_derivation();
                let cipher = Arc::clone(&self.cipher);
                let passphrase = self.passphrase.clone();
                let iterations = self.config.kdf_iterations;

                debug!("Deriving vault key with {} iterations", iterations);
                tokio::task::spawn_blocking(move || {
                    cipher.derive_key(&passphrase, APP_SALT, iterations)
                })
                .await
                .map_err(|e| VaultError::EncryptionUnavailable(format!("derivation task failed: {}", e)))?
            })
            .await
    }

    async fn seal_record(&self, record: &StoredRecord) -> Result<String> {
        let key = self.encryption_key().await?;
        let payload = serde_json::to_vec(record)
            .map_err(|e| VaultError::EncryptionUnavailable(format!("serialization failed: {}", e)))?;
        crypto::seal(self.cipher.as_ref(), &key, &payload)
    }

    fn open_record(&self, key: &EncryptionKey, sealed: &str) -> Result<StoredRecord> {
        let payload = crypto::open(self.cipher.as_ref(), key, sealed)?;
        serde_json::from_slice(&payload)
            .map_err(|e| VaultError::CorruptRecord(format!("unreadable record: {}", e)))
    }

    /// Persists `record`, removing every other stored form of `key` so a
    /// stale copy can never shadow or outlive the new value.
    async fn write_record(&self, key: &str, record: &StoredRecord) -> Result<WriteMode> {
        let encrypted_key = self.namespace.encrypted_key(key);
        let plaintext_key = self.namespace.plaintext_key(key);
        let legacy_key = self.namespace.legacy_key(key);

        match self.seal_record(record).await {
            Ok(sealed) => {
                self.storage.set(&encrypted_key, &sealed)?;
                self.storage.remove(&plaintext_key)?;
                self.storage.remove(&legacy_key)?;
                self.stats.record_encrypted_write();
                Ok(WriteMode::Encrypted)
            }
            Err(e) => {
                warn!("Storing '{}' without encryption: {}", key, e);
                let payload =
                    serde_json::to_string(record).unwrap_or_else(|_| record.value.clone());
                self.storage.set(&plaintext_key, &payload)?;
                self.storage.remove(&encrypted_key)?;
                self.storage.remove(&legacy_key)?;
                self.stats.record_plaintext_write();
                Ok(WriteMode::Plaintext)
            }
        }
    }

    async fn lookup(&self, strategy: ReadStrategy, key: &str) -> Result<Lookup> {
        let storage_key = strategy.storage_key(&self.namespace, key);
        let Some(raw) = self.storage.get(&storage_key)? else {
            return Ok(Lookup::Miss);
        };

        let record = match strategy {
            ReadStrategy::Encrypted => {
                let key_material = match self.encryption_key().await {
                    Ok(k) => k,
                    Err(e) => {
                        debug!("Skipping encrypted record for '{}': {}", key, e);
                        return Ok(Lookup::Miss);
                    }
                };
                match self.open_record(&key_material, &raw) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Ignoring encrypted record for '{}': {}", key, e);
                        self.stats.record_corrupt();
                        return Ok(Lookup::Miss);
                    }
                }
            }
            ReadStrategy::Degraded => StoredRecord::from_plaintext(&raw),
            ReadStrategy::Legacy => StoredRecord::new(raw.clone(), None),
        };

        if record.is_expired() {
            self.storage.remove(&storage_key)?;
            return Ok(Lookup::Expired);
        }

        if strategy.is_plaintext() && self.config.migrate_legacy {
            self.migrate(key, &storage_key, &raw, &record).await;
        }

        Ok(Lookup::Hit(record.value))
    }

    /// Rejects keys that are empty, too long, or whose bare form would land
    /// inside the managed namespace and alias another key's record.
    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(VaultError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(VaultError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if self.namespace.owns(key) {
            return Err(VaultError::InvalidRequest(format!(
                "Key cannot start with reserved prefix '{}:'",
                self.namespace.prefix()
            )));
        }
        Ok(())
    }

    /// Moves a plaintext hit into the encrypted namespace. Failures leave the
    /// plaintext copy in place and never fail the read.
    ///
    /// Skipped when the source no longer holds `raw`: every write to `key`
    /// replaces or removes the plaintext copy, so a write that landed while
    /// the record was being sealed wins.
    async fn migrate(&self, key: &str, source_key: &str, raw: &str, record: &StoredRecord) {
        let sealed = match self.seal_record(record).await {
            Ok(sealed) => sealed,
            Err(e) => {
                debug!("Leaving '{}' in plaintext: {}", key, e);
                return;
            }
        };

        let encrypted_key = self.namespace.encrypted_key(key);
        match self.storage.get(source_key) {
            Ok(current) if current.as_deref() == Some(raw) => {}
            Ok(_) => {
                debug!("Skipping migration of '{}': superseded by a newer write", key);
                return;
            }
            Err(e) => {
                debug!("Migration of '{}' failed: {}", key, e);
                return;
            }
        }
        if let Err(e) = self.storage.set(&encrypted_key, &sealed) {
            debug!("Migration of '{}' failed: {}", key, e);
            return;
        }
        if let Err(e) = self.storage.remove(source_key) {
            debug!("Could not remove plaintext copy of '{}': {}", key, e);
        }

        info!("Migrated '{}' into the encrypted namespace", key);
        self.stats.record_migration();
    }
}
