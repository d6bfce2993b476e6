//! Crypto Module
//!
//! Key derivation and authenticated encryption for vault records.
//!
//! # Limitation
//! The derivation passphrase is built from the host name and a client
//! identifier, both observable by anyone with local access. Records are
//! therefore obfuscated against casual inspection of the storage file, not
//! protected against a determined local attacker who can rebuild the key.

mod aes;

pub use aes::AesGcmCipher;

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, VaultError};

// == Public Constants ==
/// Derived key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Lower bound on PBKDF2 iterations accepted from configuration
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Fixed application salt mixed into every derivation
pub const APP_SALT: &[u8] = b"credvault.v1.record-key";

// == Encryption Key ==
/// A derived 256-bit symmetric key. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

// == Cipher Provider ==
/// Key derivation plus AEAD encryption.
///
/// `encrypt` returns `nonce || ciphertext` and `decrypt` expects the same
/// layout. Derivation and encryption failures are reported as
/// [`VaultError::EncryptionUnavailable`]; decryption failures (bad tag,
/// truncated blob) as [`VaultError::CorruptRecord`].
pub trait CipherProvider: Send + Sync {
    fn derive_key(&self, passphrase: &str, salt: &[u8], iterations: u32)
        -> Result<EncryptionKey>;

    fn encrypt(&self, key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>>;

    fn decrypt(&self, key: &EncryptionKey, blob: &[u8]) -> Result<Vec<u8>>;

    /// Reports whether the primitives are usable in this runtime.
    fn is_available(&self) -> bool {
        true
    }
}

/// Encrypts `plaintext` and encodes the blob as base64 text.
pub fn seal(cipher: &dyn CipherProvider, key: &EncryptionKey, plaintext: &[u8]) -> Result<String> {
    let blob = cipher.encrypt(key, plaintext)?;
    Ok(BASE64.encode(blob))
}

/// Decodes a base64 blob produced by [`seal`] and decrypts it.
pub fn open(cipher: &dyn CipherProvider, key: &EncryptionKey, encoded: &str) -> Result<Vec<u8>> {
    let blob = BASE64
        .decode(encoded.trim())
        .map_err(|e| VaultError::CorruptRecord(format!("invalid base64: {}", e)))?;
    cipher.decrypt(key, &blob)
}

/// Builds the derivation passphrase from the host name and `client_id`.
pub fn local_passphrase(client_id: &str) -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "localhost".to_string());

    format!("{}@{}", client_id, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes([7u8; KEY_LEN]);
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains('7'));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_passphrase_includes_client_id() {
        let passphrase = local_passphrase("client-a");
        assert!(passphrase.starts_with("client-a@"));
        assert!(passphrase.len() > "client-a@".len());
    }

    #[test]
    fn test_open_rejects_bad_base64() {
        let cipher = AesGcmCipher::new();
        let key = EncryptionKey::from_bytes([1u8; KEY_LEN]);

        let result = open(&cipher, &key, "%%% not base64 %%%");
        assert!(matches!(result, Err(VaultError::CorruptRecord(_))));
    }
}
