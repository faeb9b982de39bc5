//! Error types for the chirp service.
//!
//! The store layer reports typed failures through [`StoreError`]; the HTTP
//! layer converts those (and its own validation/auth failures) into an
//! [`ApiError`], which renders the service's standard error JSON envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Failures raised by store operations.
///
/// Every variant is a synchronous logic/state conflict, never a transient
/// fault, so callers do not retry. Multi-field mutations detect their
/// failure before writing anything, so a returned error means the store
/// is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed tweet, engagement or follow edge does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A user attempted to follow themselves.
    #[error("a user cannot follow themselves")]
    SelfFollow,
    /// The follow edge for this ordered pair already exists.
    #[error("already following this user")]
    AlreadyFollowing,
    /// No follow edge exists for this ordered pair.
    #[error("not following this user")]
    NotFollowing,
    /// An engagement of this kind already exists for this (user, tweet) pair.
    #[error("engagement of this type already exists for this tweet")]
    DuplicateEngagement,
}

/// An error response produced by the HTTP layer.
///
/// Serializes as `{"status": "error", "message": "..."}` with the carried
/// status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::NotFound(_) | StoreError::NotFollowing => StatusCode::NOT_FOUND,
            StoreError::SelfFollow => StatusCode::BAD_REQUEST,
            StoreError::AlreadyFollowing | StoreError::DuplicateEngagement => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({"status": "error", "message": self.message}));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_maps_to_status_codes() {
        assert_eq!(
            ApiError::from(StoreError::NotFound("tweet")).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::NotFollowing).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::SelfFollow).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::AlreadyFollowing).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::DuplicateEngagement).status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn store_error_messages_are_stable() {
        assert_eq!(
            StoreError::NotFound("tweet").to_string(),
            "tweet not found"
        );
        assert_eq!(
            StoreError::SelfFollow.to_string(),
            "a user cannot follow themselves"
        );
    }
}
