//! credvault - An encrypted local credential cache
//!
//! Caches small secrets such as bearer tokens with AES-256-GCM encryption at
//! rest, optional TTL expiry, legacy plaintext reads, and a plaintext fallback
//! when encryption is unavailable.

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod vault;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, VaultError};
pub use session::SessionStore;
pub use tasks::spawn_key_warmup;
pub use vault::{CredentialVault, VaultConfig, WriteMode};
