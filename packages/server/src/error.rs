use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use serde::Serialize;

use crate::ingest::IngestError;
use crate::store::StoreError;

/// Structured error response returned by all API endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "price must not be negative")]
    pub error: String,
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `STORAGE_ERROR`, `PERSISTENCE_ERROR`, `DATABASE_UNAVAILABLE`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Form field that failed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "price")]
    pub field: Option<&'static str>,
    /// Lower-level cause, when one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    NotFound(String),
    /// Blob store failure. Contains the provider message.
    Storage(String),
    /// Record store failure.
    Persistence(String),
    /// Record store is not connected yet.
    Unavailable,
    Internal(String),
}

impl AppError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    code: "VALIDATION_ERROR",
                    field,
                    details: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: msg,
                    code: "NOT_FOUND",
                    field: None,
                    details: None,
                },
            ),
            AppError::Storage(detail) => {
                tracing::error!("Storage error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Failed to store the image".into(),
                        code: "STORAGE_ERROR",
                        field: None,
                        details: Some(detail),
                    },
                )
            }
            AppError::Persistence(detail) => {
                tracing::error!("Persistence error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Database operation failed".into(),
                        code: "PERSISTENCE_ERROR",
                        field: None,
                        details: Some(detail),
                    },
                )
            }
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: "Database is not connected yet, try again shortly".into(),
                    code: "DATABASE_UNAVAILABLE",
                    field: None,
                    details: None,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "An unexpected error occurred".into(),
                        code: "INTERNAL_ERROR",
                        field: None,
                        details: None,
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

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => AppError::Unavailable,
            other => AppError::Persistence(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        if err.is_validation() {
            AppError::field("image", err.to_string())
        } else {
            AppError::Storage(err.to_string())
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Invalid { field, message } => AppError::field(field, message),
            IngestError::Storage(e) => e.into(),
            IngestError::Persistence(e) => e.into(),
        }
    }
}
