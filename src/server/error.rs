//! API error taxonomy and HTTP mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::ValidationError;

/// Service-boundary error. Every variant renders as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Fetch/update against a nonexistent id - 404, caller recovers.
    #[error("{0}")]
    NotFound(String),
    /// Malformed create/update payload - 400, stored state untouched.
    #[error("{0}")]
    Validation(String),
    /// Unexpected failure - 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.0)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
