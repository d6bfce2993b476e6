//! Background Tasks Module
//!
//! Contains background tasks started alongside the server.
//!
//! # Tasks
//! - Key warm-up: derives the vault key before the first request needs it

mod warmup;

pub use warmup::spawn_key_warmup;
