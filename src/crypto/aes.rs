//! AES-256-GCM cipher with PBKDF2-HMAC-SHA256 key derivation

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use sha2::Sha256;

use crate::crypto::{CipherProvider, EncryptionKey, KEY_LEN, NONCE_LEN};
use crate::error::{Result, VaultError};

/// Default cipher provider backed by the RustCrypto crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl AesGcmCipher {
    pub fn new() -> Self {
        Self
    }
}

impl CipherProvider for AesGcmCipher {
    fn derive_key(
        &self,
        passphrase: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<EncryptionKey> {
        if iterations == 0 {
            return Err(VaultError::EncryptionUnavailable(
                "iteration count must be positive".to_string(),
            ));
        }

        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key);
        Ok(EncryptionKey::from_bytes(key))
    }

    fn encrypt(&self, key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|_| VaultError::EncryptionUnavailable("invalid key length".to_string()))?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| VaultError::EncryptionUnavailable("encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn decrypt(&self, key: &EncryptionKey, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() <= NONCE_LEN {
            return Err(VaultError::CorruptRecord(format!(
                "blob of {} bytes is too short",
                blob.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|_| VaultError::CorruptRecord("invalid key length".to_string()))?;
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| VaultError::CorruptRecord("authentication failed".to_string()))
    }
}
