//! Single-flight cell for the derived encryption key.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::crypto::EncryptionKey;
use crate::error::Result;

/// Holds the process encryption key.
///
/// The cell is absent until the first caller starts a derivation. Callers
/// arriving while that derivation is in flight wait on it instead of starting
/// their own; once it succeeds every caller shares the same key. A failed
/// derivation leaves the cell absent, so the next caller tries again.
#[derive(Debug, Default)]
pub struct KeyCell {
    cell: OnceCell<Arc<EncryptionKey>>,
}

impl KeyCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached key, running `derive` only if no key is ready and
    /// no other derivation is in flight.
    pub async fn get_or_derive<F, Fut>(&self, derive: F) -> Result<Arc<EncryptionKey>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EncryptionKey>>,
    {
        self.cell
            .get_or_try_init(|| async move { derive().await.map(Arc::new) })
            .await
            .cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}
