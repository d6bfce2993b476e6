//! credvault - An encrypted local credential cache server
//!
//! Serves the credential vault over a small local HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credvault::api::{create_router, AppState};
use credvault::config::Config;
use credvault::crypto::AesGcmCipher;
use credvault::storage::{FileStorage, MemoryStorage, StorageBackend};
use credvault::tasks::spawn_key_warmup;
use credvault::vault::CredentialVault;

/// Main entry point for the credvault server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the storage backend and build the vault
/// 4. Start background key derivation
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credvault=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting credvault");

    let config = Config::from_env();
    info!(
        "Configuration loaded: namespace={}, storage={}, kdf_iterations={}, port={}",
        config.namespace,
        config
            .storage_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "memory".to_string()),
        config.kdf_iterations,
        config.server_port
    );

    let storage: Arc<dyn StorageBackend> = match &config.storage_path {
        Some(path) => Arc::new(
            FileStorage::open(path)
                .with_context(|| format!("failed to open storage at {}", path.display()))?,
        ),
        None => {
            warn!("No VAULT_STORAGE_PATH set; values will not survive a restart");
            Arc::new(MemoryStorage::new())
        }
    };

    let vault = Arc::new(CredentialVault::new(
        storage,
        Arc::new(AesGcmCipher::new()),
        config.vault_config(),
    ));
    if !vault.is_supported() {
        warn!("Vault running with reduced security: {:?}", vault.support());
    }

    let warmup_handle = spawn_key_warmup(vault.clone());

    let allowed_origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid origin in ALLOWED_ORIGINS: {}", origin);
                None
            }
        })
        .collect();

    let app = create_router(AppState::new(vault).with_allowed_origins(allowed_origins));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(warmup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the warm-up task if it is still running.
async fn shutdown_signal(warmup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if !warmup_handle.is_finished() {
        warmup_handle.abort();
        warn!("Key warm-up task aborted");
    }
}
