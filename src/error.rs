use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Path does not exist")]
    PathNotFound,

    #[error("File does not exist")]
    FileNotFound,

    #[error("File already exists")]
    AlreadyExists,

    #[error("Not a file")]
    NotAFile,

    #[error("Path is outside the base directory")]
    PathTraversal,

    #[error("{0}")]
    InvalidUpload(String),

    #[error("Error parsing `multipart/form-data` request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => GatewayError::FileNotFound,
            StorageError::AlreadyExists(_) => GatewayError::AlreadyExists,
            StorageError::NotAFile { .. } => GatewayError::NotAFile,
            StorageError::PathTraversal(_) => GatewayError::PathTraversal,
            StorageError::Io(e) => GatewayError::Io(e),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::PathNotFound | GatewayError::FileNotFound => StatusCode::NOT_FOUND,
            GatewayError::AlreadyExists
            | GatewayError::NotAFile
            | GatewayError::PathTraversal => StatusCode::FORBIDDEN,
            GatewayError::InvalidUpload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Multipart(e) => e.status(),
            // Upload streams fail as IO errors wrapping the multipart error
            GatewayError::Io(e) => match e
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>())
            {
                Some(multipart) => multipart.status(),
                None => {
                    error!("Filesystem operation failed: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        };

        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_gateway_errors() {
        let err: GatewayError = StorageError::NotFound("a".to_string()).into();
        assert!(matches!(err, GatewayError::FileNotFound));

        let err: GatewayError = StorageError::NotAFile {
            path: "docs".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::IsADirectory),
        }
        .into();
        assert!(matches!(err, GatewayError::NotAFile));
        assert_eq!(err.to_string(), "Not a file");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::PathNotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::AlreadyExists.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(GatewayError::PathTraversal.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            GatewayError::InvalidUpload("missing".to_string()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
