//! API Routes
//!
//! Configures the Axum router with all vault endpoints.

use axum::{
    http::{header, Method},
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, get_item_handler, health_handler, remove_item_handler, set_item_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /items` - Store a value
/// - `DELETE /items` - Remove every managed entry
/// - `GET /items/:key` - Retrieve a value by key
/// - `DELETE /items/:key` - Remove a key
/// - `GET /stats` - Vault statistics
/// - `GET /health` - Health and support report
///
/// # Middleware
/// - CORS: Only the origins listed in [`AppState::allowed_origins`]; none by default
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.allowed_origins.clone()))
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/items", put(set_item_handler).delete(clear_handler))
        .route("/items/:key", get(get_item_handler).delete(remove_item_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
