use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use mintbay_core::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self.0 {
            AppError::Validation(_) | AppError::SerializationError(_) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            AppError::Unauthorized(_) | AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::DatabaseError(_) | AppError::ConfigError(_) | AppError::CredentialError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        // Server-side details stay out of the response body.
        let message = if status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}
