//! Mapping of application errors to HTTP responses.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use vouch_shared::AppError;

/// An [`AppError`] on its way out as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self(AppError::invalid_input(format!(
            "Malformed multipart body: {}",
            err.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = self.0.error_code();

        let body = match &self.0 {
            AppError::InvalidInput(reasons) => json!({ "error": code, "reasons": reasons }),
            AppError::Configuration(_) | AppError::Internal(_) => {
                error!(error = %self.0, "Request failed");
                json!({ "error": code, "message": "An internal error occurred" })
            }
            other => json!({ "error": code, "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
