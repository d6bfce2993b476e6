//! Request DTOs for the vault API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;

use crate::vault::MAX_KEY_LENGTH;

/// Request body for the SET operation (PUT /items)
///
/// # Fields
/// - `key`: The vault key to store the value under
/// - `value`: The value to store
/// - `ttl_ms`: Optional TTL in milliseconds (never expires if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetItemRequest {
    /// The vault key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetItemRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}
