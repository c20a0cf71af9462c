//! services/api/src/web/response.rs
//!
//! The uniform response envelope: every endpoint answers with
//! `{status: "success", payload|message}` or `{status: "error", error}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

use adoptme_core::ports::PortError;

/// `{status: "success", payload}` with a 200 (or given) status.
pub fn success<T: Serialize>(payload: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "payload": payload })),
    )
        .into_response()
}

pub fn created<T: Serialize>(payload: T) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "status": "success", "payload": payload })),
    )
        .into_response()
}

/// `{status: "success", message}` for operations with nothing to return.
pub fn success_message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "message": message })),
    )
        .into_response()
}

/// An error envelope carrying the HTTP status to answer with.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "status": "error", "error": self.error })),
        )
            .into_response()
    }
}

impl From<PortError> for ApiFailure {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => ApiFailure::not_found(msg),
            PortError::Conflict(msg) => ApiFailure::bad_request(msg),
            PortError::Unauthorized => ApiFailure::unauthorized("Unauthorized"),
            PortError::Unexpected(msg) => ApiFailure::internal(msg),
        }
    }
}
