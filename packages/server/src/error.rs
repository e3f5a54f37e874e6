use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::{SignatureError, StorageError};
use sea_orm::DbErr;
use serde::Serialize;

use crate::repository::RepositoryError;
use crate::services::drawings::DrawingError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `INVALID_SIGNATURE`, `STORE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Node 'N-1042' not found")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    InvalidSignature(SignatureError),
    /// The object store could not be reached or refused the request.
    StoreUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::InvalidSignature(reason) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "INVALID_SIGNATURE",
                    message: format!("Download link rejected: {reason}"),
                },
            ),
            AppError::StoreUnavailable(detail) => {
                tracing::warn!("Object store unavailable: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "STORE_UNAVAILABLE",
                        message: "Object store is unavailable".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(id) => {
                AppError::Conflict(format!("Node '{id}' already exists"))
            }
            RepositoryError::Missing(id) => AppError::NotFound(format!("Node '{id}' not found")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object '{key}' not found")),
            StorageError::InvalidKey(msg) => AppError::Validation(msg),
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<SignatureError> for AppError {
    fn from(err: SignatureError) -> Self {
        AppError::InvalidSignature(err)
    }
}

impl From<DrawingError> for AppError {
    fn from(err: DrawingError) -> Self {
        match err {
            DrawingError::NotFound(id) => AppError::NotFound(format!("Node '{id}' not found")),
            DrawingError::NoArtifactRef(id) => {
                AppError::Validation(format!("Node '{id}' has no primary artifact reference"))
            }
            DrawingError::StoreUnavailable(e) => AppError::StoreUnavailable(e.to_string()),
            DrawingError::Repository(e) => e.into(),
            DrawingError::Validation(msg) => AppError::Validation(msg),
        }
    }
}
