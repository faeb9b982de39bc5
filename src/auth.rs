//! Bearer-token authentication.
//!
//! Login and registration issue stateless HS256 JWTs; every protected
//! handler resolves the `Authorization: Bearer <token>` header back to the
//! calling user through this module. There is no server-side session
//! state: a token is valid until it expires.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::store::{Store, User};

/// Claims carried by an issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The authenticated user's id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl TokenClaims {
    fn new(user_id: &str, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Create a signed bearer token for a user.
pub fn issue_token(config: &AuthConfig, user_id: &str) -> Result<String, ApiError> {
    let claims = TokenClaims::new(user_id, config.token_ttl_hours);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        warn!("Failed to sign bearer token: {}", e);
        ApiError::internal("failed to issue token")
    })
}

/// Validate and decode a bearer token.
///
/// # Returns
///
/// - `Ok(TokenClaims)`: the decoded claims, expiry already checked
/// - `Err(ApiError)`: a 401 describing whether the token was expired,
///   carried a bad signature, or was otherwise malformed
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<TokenClaims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            ApiError::unauthorized("token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            ApiError::unauthorized("invalid token signature")
        }
        _ => ApiError::unauthorized("invalid token"),
    })?;

    Ok(data.claims)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the calling user from the request headers.
///
/// Fails with 401 when the header is missing, the token does not
/// validate, or the token's subject no longer exists in the store.
pub async fn require_user(
    store: &Store,
    config: &AuthConfig,
    headers: &HeaderMap,
) -> Result<User, ApiError> {
    let token =
        bearer_token(headers).ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
    let claims = validate_token(config, token)?;
    match store.user_by_id(&claims.sub).await {
        Some(user) => Ok(user),
        None => {
            debug!("bearer token subject {} no longer exists", claims.sub);
            Err(ApiError::unauthorized("unknown token subject"))
        }
    }
}

/// Resolve the calling user if valid credentials were supplied.
///
/// Anonymous requests and requests with unusable tokens both resolve to
/// `None` — endpoints using this never reject on auth grounds.
pub async fn optional_user(store: &Store, config: &AuthConfig, headers: &HeaderMap) -> Option<User> {
    let token = bearer_token(headers)?;
    let claims = validate_token(config, token).ok()?;
    store.user_by_id(&claims.sub).await
}
