//! Vault Module
//!
//! Encrypted credential cache with lazy TTL expiry, legacy plaintext reads,
//! and a plaintext fallback when encryption is unavailable.

mod keycell;
mod record;
mod stats;
mod store;
mod strategy;


// Re-export public types
pub use keycell::KeyCell;
pub use record::{current_timestamp_ms, StoredRecord};
pub use stats::{StatsSnapshot, VaultStats};
pub use store::{CredentialVault, SupportReport, VaultConfig};
pub use strategy::{Lookup, Namespace, ReadStrategy, WriteMode, READ_ORDER};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Default maximum value size in bytes
pub const MAX_VALUE_SIZE: usize = 256 * 1024; // 256 KiB

#[cfg(test)]
pub(crate) mod testing {
    //! Cipher doubles and fixtures shared by the vault's unit tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::crypto::{AesGcmCipher, CipherProvider, EncryptionKey};
    use crate::error::{Result, VaultError};
    use crate::vault::VaultConfig;

    /// Low iteration count keeps derivation fast under test.
    pub fn test_config() -> VaultConfig {
        VaultConfig {
            kdf_iterations: 1_000,
            ..VaultConfig::default()
        }
    }

    /// Real cipher that counts derivations and stalls each one.
    pub struct CountingCipher {
        inner: AesGcmCipher,
        delay: Duration,
        derivations: AtomicUsize,
    }

    impl CountingCipher {
        pub fn new(delay: Duration) -> Self {
            Self {
                inner: AesGcmCipher::new(),
                delay,
                derivations: AtomicUsize::new(0),
            }
        }

        pub fn derivations(&self) -> usize {
            self.derivations.load(Ordering::SeqCst)
        }
    }

    impl CipherProvider for CountingCipher {
        fn derive_key(&self, passphrase: &str, salt: &[u8], iterations: u32) -> Result<EncryptionKey> {
            self.derivations.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.inner.derive_key(passphrase, salt, iterations)
        }

        fn encrypt(&self, key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
            self.inner.encrypt(key, plaintext)
        }

        fn decrypt(&self, key: &EncryptionKey, blob: &[u8]) -> Result<Vec<u8>> {
            self.inner.decrypt(key, blob)
        }
    }

    #[derive(Clone, Copy)]
    enum Failure {
        Unavailable,
        Derivation,
        Encryption,
    }

    /// Cipher that fails at a chosen step.
    pub struct FailingCipher {
        failure: Failure,
        inner: AesGcmCipher,
    }

    impl FailingCipher {
        /// Reports the primitives as missing.
        pub fn unavailable() -> Self {
            Self::with(Failure::Unavailable)
        }

        /// Key derivation throws.
        pub fn derivation() -> Self {
            Self::with(Failure::Derivation)
        }

        /// Derivation works but every encryption throws.
        pub fn encryption() -> Self {
            Self::with(Failure::Encryption)
        }

        fn with(failure: Failure) -> Self {
            Self {
                failure,
                inner: AesGcmCipher::new(),
            }
        }
    }

    impl CipherProvider for FailingCipher {
        fn derive_key(&self, passphrase: &str, salt: &[u8], iterations: u32) -> Result<EncryptionKey> {
            match self.failure {
                Failure::Encryption => self.inner.derive_key(passphrase, salt, iterations),
                _ => Err(VaultError::EncryptionUnavailable("derivation failed".to_string())),
            }
        }

        fn encrypt(&self, _key: &EncryptionKey, _plaintext: &[u8]) -> Result<Vec<u8>> {
            Err(VaultError::EncryptionUnavailable("encryption failed".to_string()))
        }

        fn decrypt(&self, _key: &EncryptionKey, _blob: &[u8]) -> Result<Vec<u8>> {
            Err(VaultError::CorruptRecord("decryption failed".to_string()))
        }

        fn is_available(&self) -> bool {
            !matches!(self.failure, Failure::Unavailable)
        }
    }
}
