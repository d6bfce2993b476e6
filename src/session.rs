//! Session Module
//!
//! Vault consumers for the authentication flow: the bearer token store and
//! persisted application state.
//!
//! Failures here never propagate into the caller's flow. A token that cannot
//! be read means "not authenticated"; state that cannot be read means
//! "start fresh".

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, VaultError};
use crate::vault::{CredentialVault, WriteMode};

/// Vault key holding the session bearer token
pub const TOKEN_KEY: &str = "auth_token";

/// Key prefix for persisted state blobs
const STATE_PREFIX: &str = "persist:";

// == Session Store ==
/// Stores and reads the session bearer token through a shared vault.
#[derive(Clone)]
pub struct SessionStore {
    vault: Arc<CredentialVault>,
}

impl SessionStore {
    pub fn new(vault: Arc<CredentialVault>) -> Self {
        Self { vault }
    }

    /// Caches `token`, expiring after `ttl` when given.
    pub async fn save_token(&self, token: &str, ttl: Option<Duration>) -> Result<WriteMode> {
        let mode = self.vault.set_item(TOKEN_KEY, token, ttl).await?;
        if mode == WriteMode::Plaintext {
            warn!("Session token stored without encryption");
        }
        Ok(mode)
    }

    /// Returns the cached token, or None if absent, expired, or unreadable.
    pub async fn token(&self) -> Option<String> {
        match self.vault.get_item(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Treating session as signed out: {}", e);
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    /// Forgets the token. Errors are logged and swallowed.
    pub fn logout(&self) {
        if let Err(e) = self.vault.remove_item(TOKEN_KEY) {
            warn!("Failed to remove session token: {}", e);
        }
    }

    // == Persisted State ==

    /// Serializes `state` into the vault under `name`.
    pub async fn save_state<T: Serialize>(&self, name: &str, state: &T) -> Result<WriteMode> {
        let json = serde_json::to_string(state)
            .map_err(|e| VaultError::InvalidRequest(format!("unserializable state: {}", e)))?;
        self.vault.set_item(&state_key(name), &json, None).await
    }

    /// Rehydrates state saved under `name`.
    ///
    /// State that no longer decodes into `T` is removed so the next save
    /// starts clean.
    pub async fn load_state<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let key = state_key(name);
        let json = match self.vault.get_item(&key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not rehydrate '{}': {}", name, e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!("Discarding undecodable state '{}': {}", name, e);
                if let Err(e) = self.vault.remove_item(&key) {
                    warn!("Failed to discard state '{}': {}", name, e);
                }
                None
            }
        }
    }

    pub fn purge_state(&self, name: &str) -> Result<()> {
        self.vault.remove_item(&state_key(name))
    }
}

fn state_key(name: &str) -> String {
    format!("{}{}", STATE_PREFIX, name)
}
