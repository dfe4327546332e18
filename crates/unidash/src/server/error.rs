//! HTTP mapping for handler failures.
//!
//! Clients get a short `{"error": ...}` body; controller detail stays in the
//! logs.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use unidash_core::CoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body or missing field.
    BadRequest(String),
    Core(CoreError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        let err = match self {
            Self::BadRequest(message) => return (StatusCode::BAD_REQUEST, message.clone()),
            Self::Core(err) => err,
        };

        match err {
            CoreError::ValidationFailed { message } => (StatusCode::BAD_REQUEST, message.clone()),
            CoreError::SiteNotFound { .. } => (StatusCode::NOT_FOUND, "Site not found".into()),
            CoreError::Conflict { message } => (StatusCode::CONFLICT, message.clone()),
            CoreError::ConnectionFailed { .. }
            | CoreError::Timeout { .. }
            | CoreError::Api { .. } => {
                warn!(error = %err, "controller request failed");
                (StatusCode::BAD_GATEWAY, "Controller request failed".into())
            }
            CoreError::AuthenticationFailed { .. }
            | CoreError::Snapshot(_)
            | CoreError::Config { .. }
            | CoreError::Internal(_) => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
