//! # Chirp Library
//!
//! A Rust web service library implementing a minimal Twitter-style social
//! backend: user registration/login with bearer-token auth, tweet CRUD
//! with `@mention` extraction, a follow graph and per-tweet engagement,
//! all backed by an in-memory store that resets on restart.
//!
//! ## Features
//!
//! - JSON-over-HTTP API built on axum
//! - Stateless HS256 bearer tokens, scrypt-hashed passwords
//! - Explicitly constructed store injected into every handler
//! - Structured logging
//! - Comprehensive test suite
//!
//! ## Configuration
//!
//! - `CHIRP_JWT_SECRET`: bearer-token signing secret (required)
//! - `CHIRP_TOKEN_TTL_HOURS`: token lifetime in hours (defaults to 24)
//! - `PORT`: server port (defaults to 3000)

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod password;
pub mod store;

// Re-export commonly used types and functions
pub use config::{get_server_port, AuthConfig};
pub use error::{ApiError, StoreError};
pub use handlers::{app, AppState};
pub use store::{EngagementKind, Store};
