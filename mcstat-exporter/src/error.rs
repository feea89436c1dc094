use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// API error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Building or encoding the exposition failed
    Render(prometheus::Error),
    /// No status has been acquired yet
    NoStatus,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Render(err) => {
                // Log the detailed error server-side
                tracing::error!(?err, "Failed to render metrics");
                let error_response =
                    ErrorResponse::with_details("Failed to render metrics", err.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
            }
            AppError::NoStatus => {
                let error_response = ErrorResponse::new("no status available");
                (StatusCode::SERVICE_UNAVAILABLE, Json(error_response)).into_response()
            }
        }
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Render(err)
    }
}
