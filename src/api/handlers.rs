//! API Handlers
//!
//! HTTP request handlers for each vault endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderValue,
    Json,
};

use crate::error::{Result, VaultError};
use crate::models::{
    ClearResponse, GetItemResponse, HealthResponse, RemoveItemResponse, SetItemRequest,
    SetItemResponse, StatsResponse,
};
use crate::vault::CredentialVault;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The shared credential vault
    pub vault: Arc<CredentialVault>,
    /// Browser origins allowed to read responses cross-origin
    pub allowed_origins: Vec<HeaderValue>,
}

impl AppState {
    /// State with no cross-origin access.
    pub fn new(vault: Arc<CredentialVault>) -> Self {
        Self {
            vault,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_allowed_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.allowed_origins = origins;
        self
    }
}

/// Handler for PUT /items
///
/// Stores a value with optional TTL and reports how it was persisted.
pub async fn set_item_handler(
    State(state): State<AppState>,
    Json(req): Json<SetItemRequest>,
) -> Result<Json<SetItemResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(VaultError::InvalidRequest(error_msg));
    }

    let mode = state.vault.set_item(&req.key, &req.value, req.ttl()).await?;

    Ok(Json(SetItemResponse::new(req.key, mode)))
}

/// Handler for GET /items/:key
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetItemResponse>> {
    match state.vault.get_item(&key).await? {
        Some(value) => Ok(Json(GetItemResponse::new(key, value))),
        None => Err(VaultError::NotFound(key)),
    }
}

/// Handler for DELETE /items/:key
///
/// Idempotent: removing a missing key still succeeds.
pub async fn remove_item_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RemoveItemResponse>> {
    state.vault.remove_item(&key)?;

    Ok(Json(RemoveItemResponse::new(key)))
}

/// Handler for DELETE /items
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.vault.clear()?;

    Ok(Json(ClearResponse { removed }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.vault.stats(),
        state.vault.key_ready(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_support(state.vault.support()))
}
