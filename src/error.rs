//! Error types for the credential vault
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Vault Error Enum ==
/// Unified error type for the credential vault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The storage backend is missing or disabled
    #[error("Storage backend unavailable")]
    UnsupportedEnvironment,

    /// Cipher primitives missing or key derivation failed
    #[error("Encryption unavailable: {0}")]
    EncryptionUnavailable(String),

    /// An encrypted record could not be decrypted or parsed
    #[error("Corrupt or foreign record: {0}")]
    CorruptRecord(String),

    /// The backing store rejected a read or write
    #[error("Backing store failure: {0}")]
    BackingStore(String),

    /// No live value for the key (API surface only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let status = match &self {
            VaultError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            VaultError::UnsupportedEnvironment | VaultError::BackingStore(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            VaultError::EncryptionUnavailable(_) | VaultError::CorruptRecord(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the credential vault.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (VaultError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (VaultError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (VaultError::UnsupportedEnvironment, StatusCode::SERVICE_UNAVAILABLE),
            (VaultError::BackingStore("quota".into()), StatusCode::SERVICE_UNAVAILABLE),
            (VaultError::CorruptRecord("tag".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
