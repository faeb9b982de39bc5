//! # Chirp
//!
//! A Rust web service implementing a minimal Twitter-style social backend.
//! State lives entirely in memory and is lost on restart; the HTTP surface
//! speaks JSON with bearer-token authentication.
//!
//! ## Environment Variables
//!
//! - `CHIRP_JWT_SECRET`: bearer-token signing secret (required)
//! - `CHIRP_TOKEN_TTL_HOURS`: token lifetime in hours (defaults to 24)
//! - `PORT`: server port (defaults to 3000)
//! - `RUST_LOG`: log level filter for `env_logger`
//!
//! ## Example Usage
//!
//! ```bash
//! # Run with default port 3000
//! CHIRP_JWT_SECRET=$(openssl rand -hex 32) cargo run
//!
//! # Run on custom port with debug logging
//! PORT=8080 RUST_LOG=debug CHIRP_JWT_SECRET=... cargo run
//! ```

use std::net::SocketAddr;

use log::{error, info};

use chirp::config::get_server_port;
use chirp::handlers::{app, AppState};
use chirp::{AuthConfig, Store};

/// Main entry point for the chirp web service.
///
/// Initializes logging, loads the authentication configuration, constructs
/// the in-memory store and serves the HTTP API until terminated.
#[tokio::main]
async fn main() {
    // Initialize the logging system
    env_logger::init();

    let auth = match AuthConfig::from_env() {
        Ok(auth) => auth,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // One store for the whole process, constructed here and injected into
    // every handler. All state is gone when the process exits.
    let state = AppState {
        store: Store::new(),
        auth,
    };

    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    info!("Starting chirp server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app(state)).await {
        error!("HTTP server error: {}", e);
    }
}
