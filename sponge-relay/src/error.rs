//! Error types for sponge-relay
//!
//! Every error reaching the browser is rendered as
//! `{"error": {"code": ..., "message": ...}}` with a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{InvalidParam, PartialLogin};
use crate::services::{RelayError, TransportError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream call failed (502)
    #[error(transparent)]
    Upstream(#[from] TransportError),
}

impl From<PartialLogin> for ApiError {
    fn from(err: PartialLogin) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<InvalidParam> for ApiError {
    fn from(err: InvalidParam) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::InvalidRequest(e) => ApiError::BadRequest(e.to_string()),
            RelayError::Transport(e) => ApiError::Upstream(e),
        }
    }
}

impl ApiError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
