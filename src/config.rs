//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::crypto::MIN_KDF_ITERATIONS;
use crate::vault::{VaultConfig, MAX_VALUE_SIZE};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Prefix for every managed storage key
    pub namespace: String,
    /// JSON storage file; None keeps the vault in memory
    pub storage_path: Option<PathBuf>,
    /// Client identifier mixed into the key derivation passphrase
    pub client_id: String,
    /// PBKDF2 iteration count, never below [`MIN_KDF_ITERATIONS`]
    pub kdf_iterations: u32,
    /// Re-write plaintext entries into the encrypted namespace on read
    pub migrate_legacy: bool,
    /// Largest accepted value in bytes
    pub max_value_size: usize,
    /// Browser origins granted cross-origin access to the HTTP API
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `VAULT_NAMESPACE` - Storage key prefix (default: credvault)
    /// - `VAULT_STORAGE_PATH` - JSON storage file (default: in-memory)
    /// - `VAULT_CLIENT_ID` - Derivation client identifier (default: credvault/<version>)
    /// - `KDF_ITERATIONS` - PBKDF2 iterations (default and minimum: 100000)
    /// - `MIGRATE_LEGACY` - Migrate plaintext entries on read (default: true)
    /// - `MAX_VALUE_SIZE` - Maximum value size in bytes (default: 262144)
    /// - `ALLOWED_ORIGINS` - Comma-separated CORS origins (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            namespace: env::var("VAULT_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace),
            storage_path: env::var("VAULT_STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            client_id: env::var("VAULT_CLIENT_ID")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.client_id),
            kdf_iterations: parse_var("KDF_ITERATIONS")
                .unwrap_or(defaults.kdf_iterations)
                .max(MIN_KDF_ITERATIONS),
            migrate_legacy: parse_var("MIGRATE_LEGACY").unwrap_or(defaults.migrate_legacy),
            max_value_size: parse_var("MAX_VALUE_SIZE").unwrap_or(defaults.max_value_size),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or(defaults.allowed_origins),
        }
    }

    /// Builds the vault settings from this configuration.
    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig {
            namespace: self.namespace.clone(),
            client_id: self.client_id.clone(),
            kdf_iterations: self.kdf_iterations,
            migrate_legacy: self.migrate_legacy,
            max_value_size: self.max_value_size,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        let vault = VaultConfig::default();
        Self {
            server_port: 3000,
            namespace: vault.namespace,
            storage_path: None,
            client_id: vault.client_id,
            kdf_iterations: vault.kdf_iterations,
            migrate_legacy: vault.migrate_legacy,
            max_value_size: MAX_VALUE_SIZE,
            allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.namespace, "credvault");
        assert!(config.storage_path.is_none());
        assert_eq!(config.kdf_iterations, 100_000);
        assert!(config.migrate_legacy);
        assert_eq!(config.max_value_size, 256 * 1024);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:5173, ,https://app.example "),
            vec!["http://localhost:5173".to_string(), "https://app.example".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_config_from_env() {
        // Only test that mutates the process environment
        env::remove_var("SERVER_PORT");
        env::remove_var("VAULT_NAMESPACE");
        env::remove_var("VAULT_STORAGE_PATH");
        env::remove_var("VAULT_CLIENT_ID");
        env::remove_var("MIGRATE_LEGACY");
        env::remove_var("MAX_VALUE_SIZE");
        env::remove_var("ALLOWED_ORIGINS");
        env::set_var("KDF_ITERATIONS", "10");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.namespace, "credvault");
        assert!(config.storage_path.is_none());
        assert_eq!(config.kdf_iterations, MIN_KDF_ITERATIONS, "Clamped to the floor");

        env::set_var("KDF_ITERATIONS", "250000");
        env::set_var("VAULT_STORAGE_PATH", "/tmp/credvault.json");
        env::set_var("MIGRATE_LEGACY", "false");

        let config = Config::from_env();
        assert_eq!(config.kdf_iterations, 250_000);
        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/credvault.json")));
        assert!(!config.migrate_legacy);

        env::remove_var("KDF_ITERATIONS");
        env::remove_var("VAULT_STORAGE_PATH");
        env::remove_var("MIGRATE_LEGACY");
    }

    #[test]
    fn test_vault_config_mirrors_fields() {
        let config = Config {
            namespace: "app".to_string(),
            client_id: "web-client".to_string(),
            ..Config::default()
        };

        let vault = config.vault_config();
        assert_eq!(vault.namespace, "app");
        assert_eq!(vault.client_id, "web-client");
        assert_eq!(vault.kdf_iterations, config.kdf_iterations);
    }
}
