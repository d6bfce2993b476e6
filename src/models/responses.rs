//! Response DTOs for the vault API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::vault::{StatsSnapshot, SupportReport, WriteMode};

/// Response body for GET /items/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetItemResponse {
    pub key: String,
    pub value: String,
}

impl GetItemResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for PUT /items
#[derive(Debug, Clone, Serialize)]
pub struct SetItemResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Whether the value was stored encrypted or in plaintext
    pub mode: WriteMode,
}

impl SetItemResponse {
    pub fn new(key: impl Into<String>, mode: WriteMode) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored successfully", key),
            key,
            mode,
        }
    }
}

/// Response body for DELETE /items/:key
#[derive(Debug, Clone, Serialize)]
pub struct RemoveItemResponse {
    pub message: String,
    pub key: String,
}

impl RemoveItemResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for DELETE /items
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of stored entries deleted
    pub removed: usize,
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StatsSnapshot,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Whether the encryption key has been derived
    pub key_ready: bool,
}

impl StatsResponse {
    pub fn new(stats: StatsSnapshot, key_ready: bool) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            key_ready,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" when fully supported, "degraded" without encryption,
    /// "unavailable" without storage
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub storage: bool,
    pub encryption: bool,
}

impl HealthResponse {
    pub fn from_support(support: SupportReport) -> Self {
        let status = match (support.storage, support.encryption) {
            (true, true) => "healthy",
            (true, false) => "degraded",
            (false, _) => "unavailable",
        };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            storage: support.storage,
            encryption: support.encryption,
        }
    }
}
