use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::services::blob_store::BlobStoreError;
use crate::services::discovery_service::DiscoveryError;

/// Web-facing error. Every variant renders as
/// `{"status": "fail", "message": ...}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("profile store unavailable")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("image storage failed: {0}")]
    BlobStore(#[from] BlobStoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BlobStore(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let unique_violation = e
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique_violation {
            return AppError::Conflict("username or email already taken".to_string());
        }
        AppError::StoreUnavailable(e)
    }
}

impl From<DiscoveryError> for AppError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::Validation(message) => AppError::BadRequest(message),
            DiscoveryError::StoreUnavailable(e) => AppError::StoreUnavailable(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::StoreUnavailable(e) => warn!(error = %e, "store_unavailable"),
            AppError::BlobStore(e) => warn!(error = %e, "blob_store_failed"),
            AppError::Internal(e) => warn!(error = %e, "internal_error"),
            _ => {}
        }

        let message = match &self {
            AppError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        (
            status,
            Json(json!({ "status": "fail", "message": message })),
        )
            .into_response()
    }
}
