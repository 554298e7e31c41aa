//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use platform_core::{DomainError, ErrorKind};

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Domain(e) => match e.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::BackendUnavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE")
                }
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::Domain(e) => e.to_string(),
            ApiError::Unauthorized(msg) | ApiError::BadRequest(msg) => msg.clone(),
        };

        if status.is_server_error() {
            tracing::error!(%status, code, "{}", message);
        } else {
            tracing::warn!(%status, code, "{}", message);
        }

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}
