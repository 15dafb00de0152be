use analyzer::stream::{BatchError, SourceError};
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No files uploaded")]
    NoFiles,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Parse(#[from] BatchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFiles | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Multipart(e) => e.status(),
            ApiError::Parse(BatchError::Read {
                source: SourceError::LineTooLarge { .. },
                ..
            }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Parse(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures are logged in full and sanitized for the client
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An internal error occurred".to_string()
            }
            ApiError::Parse(err) if status.is_server_error() => {
                tracing::error!("Parse failed: {}", err);
                format!("Error reading file {}", err.filename())
            }
            _ => {
                tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
                self.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NoFiles.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::SessionNotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_line_too_large_is_unprocessable() {
        let err = ApiError::Parse(BatchError::Read {
            filename: "big.log".to_string(),
            source: SourceError::LineTooLarge { line: 3, len: 10, max: 5 },
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("big.log"));
    }

    #[test]
    fn test_io_failure_is_server_error() {
        let err = ApiError::Parse(BatchError::Read {
            filename: "a.log".to_string(),
            source: SourceError::Io(io::Error::other("disk")),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
