//! Error types and the JSON error envelope

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use boxrelay_client::StorageError;
use serde::Serialize;
use thiserror::Error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Can't get file part from multipart: {0}")]
    Multipart(#[from] MultipartError),
}

/// Body of every error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error_code: u32,
    pub error_description: String,
}

impl ApiError {
    /// Get the numeric error code
    pub fn error_code(&self) -> u32 {
        match self {
            Self::Storage(e) => e.code(),
            Self::Multipart(_) => StorageError::MULTIPART_EXTRACTION,
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Multipart(e) => e.status(),
            Self::Storage(e) => storage_status(e),
        }
    }
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::FileNotFound => StatusCode::NOT_FOUND,
        StorageError::FileModified { .. } => StatusCode::CONFLICT,
        StorageError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        e if e.is_upstream() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        } else {
            tracing::warn!(error = %self, code = self.error_code(), "Request rejected");
        }

        let envelope = ErrorEnvelope {
            error_code: self.error_code(),
            error_description: self.to_string(),
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(StorageError::FileNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::FileModified { expected: None, actual: None }).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::MultipartExtraction("no file".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StorageError::Status { status: 500, message: "x".into(), body: None })
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_incomplete_upload_status_follows_cause() {
        let client_side = StorageError::IncompleteUpload { expected: 2, written: 1, cause: None };
        assert_eq!(ApiError::from(client_side).status_code(), StatusCode::BAD_REQUEST);

        let upstream = StorageError::IncompleteUpload {
            expected: 2,
            written: 1,
            cause: Some(Box::new(StorageError::Connect("refused".into()))),
        };
        let error = ApiError::from(upstream);
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.error_code(), StorageError::INCOMPLETE_UPLOAD);
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope {
            error_code: 30009,
            error_description: "File not exists".to_string(),
        };
        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            serde_json::json!({"errorCode": 30009, "errorDescription": "File not exists"})
        );
    }
}
