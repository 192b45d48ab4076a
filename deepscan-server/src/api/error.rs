//! API errors
//!
//! Request problems answer 400. A scan that could not run answers 500 with
//! the scan error text, e.g. the missing dependencies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deepscan_runner::ScanError;

/// Failure of an API request
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be read as a scan request
    BadRequest(String),
    /// The scan aborted before producing a result
    ScanFailed(ScanError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ScanFailed(ScanError::InvalidOptions(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::ScanFailed(err) => {
                tracing::error!("Scan aborted: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        ApiError::ScanFailed(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
