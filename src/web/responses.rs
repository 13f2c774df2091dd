//! Standardized error responses
//!
//! Maps the fetch error taxonomy onto HTTP status codes and the structured
//! `{success, error, error_code}` body callers consume.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::FetchError;

/// Body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new<E: Into<String>, C: Into<String>>(error: E, error_code: C) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}

/// HTTP status for each error kind
pub fn status_for(error: &FetchError) -> StatusCode {
    match error {
        FetchError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        FetchError::ChannelNotFound { .. } => StatusCode::NOT_FOUND,
        FetchError::PostNotFound { .. } => StatusCode::NOT_FOUND,
        FetchError::ChannelPrivate { .. } => StatusCode::FORBIDDEN,
        FetchError::ChannelBlocked { .. } => StatusCode::FORBIDDEN,
        FetchError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        FetchError::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        // Unclassified failures are logged in full but returned opaque
        let message = match &self {
            FetchError::Unknown { message } => {
                error!("Unexpected error: {}", message);
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(message, self.error_code());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&FetchError::invalid_url("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&FetchError::PostNotFound {
                channel: "c".into(),
                message_id: 1
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&FetchError::ChannelPrivate { channel: "c".into() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&FetchError::RateLimited { retry_after: 30 }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(&FetchError::unknown("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
