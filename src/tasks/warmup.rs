//! Key Warm-up Task
//!
//! Derives the vault encryption key in the background at startup so the
//! first request does not pay for the full PBKDF2 run.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::vault::CredentialVault;

/// Spawns a one-shot task that derives the vault key.
///
/// Requests arriving while the derivation runs join it instead of starting
/// another. A failure is logged and leaves the vault to retry on demand, or
/// to keep writing in plaintext if encryption stays unavailable.
///
/// # Example
/// ```ignore
/// let handle = spawn_key_warmup(vault.clone());
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_key_warmup(vault: Arc<CredentialVault>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !vault.support().encryption {
            warn!("Encryption unavailable; vault will store values in plaintext");
            return;
        }

        match vault.warm_up().await {
            Ok(()) => info!("Vault encryption key ready"),
            Err(e) => warn!("Vault key derivation failed: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AesGcmCipher;
    use crate::storage::MemoryStorage;
    use crate::vault::testing::{test_config, CountingCipher, FailingCipher};
    use std::time::Duration;

    #[tokio::test]
    async fn test_warmup_derives_key() {
        let vault = Arc::new(CredentialVault::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(AesGcmCipher::new()),
            test_config(),
        ));

        spawn_key_warmup(vault.clone()).await.unwrap();

        assert!(vault.key_ready());
    }

    #[tokio::test]
    async fn test_requests_during_warmup_share_derivation() {
        let cipher = Arc::new(CountingCipher::new(Duration::from_millis(100)));
        let vault = Arc::new(CredentialVault::new(
            Arc::new(MemoryStorage::new()),
            cipher.clone(),
            test_config(),
        ));

        let handle = spawn_key_warmup(vault.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        vault.set_item("auth_token", "abc", None).await.unwrap();
        handle.await.unwrap();

        assert_eq!(cipher.derivations(), 1);
    }

    #[tokio::test]
    async fn test_warmup_without_encryption_finishes() {
        let vault = Arc::new(CredentialVault::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(FailingCipher::unavailable()),
            test_config(),
        ));

        spawn_key_warmup(vault.clone()).await.unwrap();

        assert!(!vault.key_ready());
    }

    #[tokio::test]
    async fn test_warmup_can_be_aborted() {
        let cipher = Arc::new(CountingCipher::new(Duration::from_millis(200)));
        let vault = Arc::new(CredentialVault::new(
            Arc::new(MemoryStorage::new()),
            cipher,
            test_config(),
        ));

        let handle = spawn_key_warmup(vault);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
