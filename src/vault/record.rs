//! Stored Record Module
//!
//! Defines the unit persisted per key, with optional absolute expiry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Stored Record ==
/// A cached value plus its expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// The cached value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl StoredRecord {
    // == Constructor ==
    /// Creates a record that expires `ttl` from now, or never when `ttl` is None.
    pub fn new(value: impl Into<String>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|ttl| {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            current_timestamp_ms().saturating_add(ttl_ms)
        });

        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Interprets a plaintext payload.
    ///
    /// Degraded-mode writes store the serialized record; anything that does
    /// not parse as one is taken to be a bare value without expiry.
    pub fn from_plaintext(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Self::new(raw, None))
    }

    // == Is Expired ==
    /// Checks if the record has expired.
    ///
    /// A record is expired once the current time is strictly past `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        matches!(self.expires_at, Some(expires) if now_ms > expires)
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            let remaining = expires.saturating_sub(current_timestamp_ms()).max(0);
            Duration::from_millis(remaining as u64)
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
