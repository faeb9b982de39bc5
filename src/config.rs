//! Configuration module for the chirp service.
//!
//! All configuration comes from environment variables: the listen port,
//! the bearer-token signing secret and the token lifetime. Secrets are
//! masked before they ever reach the log output.

use std::env;

use log::{debug, info, warn};

/// Authentication configuration loaded at process start.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Issued-token lifetime in hours.
    pub token_ttl_hours: i64,
}

impl AuthConfig {
    /// Load the authentication configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `CHIRP_JWT_SECRET`: secret used to sign and verify bearer tokens
    ///
    /// # Optional Environment Variables
    ///
    /// - `CHIRP_TOKEN_TTL_HOURS`: token lifetime in hours (defaults to 24)
    ///
    /// # Returns
    ///
    /// - `Ok(AuthConfig)`: if the required variable is present and non-empty
    /// - `Err(...)`: if the secret is missing or the TTL cannot be parsed
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Loading authentication configuration from environment variables");

        let jwt_secret = env::var("CHIRP_JWT_SECRET").map_err(|_| {
            "CHIRP_JWT_SECRET environment variable is not set. \
             Generate one with: openssl rand -hex 32"
        })?;
        if jwt_secret.is_empty() {
            return Err("CHIRP_JWT_SECRET must not be empty".into());
        }
        if jwt_secret.len() < 32 {
            warn!(
                "CHIRP_JWT_SECRET is unusually short ({} characters)",
                jwt_secret.len()
            );
        }
        debug!("JWT secret (masked): {}", mask_secret(&jwt_secret));

        let token_ttl_hours = match env::var("CHIRP_TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|e| format!("CHIRP_TOKEN_TTL_HOURS is not a valid number: {e}"))?,
            Err(_) => 24,
        };
        info!("Bearer tokens will be valid for {} hours", token_ttl_hours);

        Ok(Self {
            jwt_secret,
            token_ttl_hours,
        })
    }
}

/// Masks a secret for safe logging, keeping at most the first and last
/// four characters visible.
pub(crate) fn mask_secret(secret: &str) -> String {
    if secret.len() > 8 {
        format!("{}...{}", &secret[..4], &secret[secret.len() - 4..])
    } else {
        "****".to_string()
    }
}

/// Gets the server port from environment variables or returns the default.
///
/// Reads the `PORT` environment variable and parses it as a u16, defaulting
/// to 3000 when unset.
///
/// # Panics
///
/// Panics if `PORT` is set to a value that cannot be parsed as a port
/// number — the process cannot meaningfully start in that case.
pub fn get_server_port() -> u16 {
    env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .expect("PORT must be a valid number")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_only_the_edges() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
