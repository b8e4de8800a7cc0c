//! Standardized API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ApiErrorCode {
    ConfigurationError,
    ProviderError,
    InvalidJson,
    MissingJobId,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::ConfigurationError | ApiErrorCode::ProviderError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiErrorCode::InvalidJson | ApiErrorCode::MissingJobId => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error body: `{"code": ..., "message": ..., "details": ...}`.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    #[ts(type = "unknown")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidJson, message)
    }

    pub fn missing_job_id() -> Self {
        Self::new(ApiErrorCode::MissingJobId, "Missing job id")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "request failed");
        }
        (status, Json(self)).into_response()
    }
}

impl From<crate::generation::GenerateError> for ApiError {
    fn from(err: crate::generation::GenerateError) -> Self {
        use crate::generation::GenerateError;
        match err {
            GenerateError::Configuration => {
                ApiError::new(ApiErrorCode::ConfigurationError, err.to_string())
            }
            GenerateError::Provider(e) => ApiError::new(ApiErrorCode::ProviderError, e.to_string()),
        }
    }
}
