//! API Module
//!
//! HTTP handlers and routing for the vault REST API.
//!
//! # Endpoints
//! - `PUT /items` - Store a value
//! - `DELETE /items` - Remove every managed entry
//! - `GET /items/:key` - Retrieve a value by key
//! - `DELETE /items/:key` - Remove a key
//! - `GET /stats` - Vault statistics
//! - `GET /health` - Health and support report

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
