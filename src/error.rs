//! Service error taxonomy
//!
//! Every failure in the service maps to one variant here, and every
//! variant maps to a proper HTTP status with a `{"detail": ...}` JSON
//! body. Raw filesystem errors are logged but never surfaced to clients.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload named something other than `*.csv`
    #[error("Only CSV files allowed")]
    InvalidExtension(String),

    /// Multipart payload missing a file field, or empty
    #[error("Invalid upload payload: {0}")]
    BadUpload(String),

    /// Missing or mismatched access token
    #[error("Invalid or missing access token")]
    Unauthorized,

    #[error("File not found")]
    NotFound,

    /// A required credential is not present in the environment
    #[error("Server is missing required credential: {0}")]
    MissingCredential(&'static str),

    /// The remote storage API answered with a non-success status
    #[error("Remote mirror failed ({status}): {body}")]
    Mirror { status: u16, body: String },

    /// The remote storage API could not be reached at all
    #[error("Remote mirror unreachable: {0}")]
    MirrorTransport(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidExtension(_) | ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Mirror { .. } | ApiError::MirrorTransport(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            ApiError::Storage(e) => {
                error!("Storage failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "detail": detail }))
    }
}

impl ApiError {
    /// Map a filesystem error to the taxonomy, turning a missing file
    /// into NotFound instead of a generic storage failure.
    pub fn from_io(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::NotFound
        } else {
            ApiError::Storage(e)
        }
    }
}
