//! # HTTP API Errors
//!
//! Every handler failure is an [`ApiError`]; its status and JSON body are
//! decided here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::item::{FieldError, ValidationErrors};
use crate::object_id::{ObjectId, ObjectIdError};
use crate::store::StoreError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Path id is not a valid external identifier
    #[error("Invalid item id: {0}")]
    InvalidIdentifier(#[from] ObjectIdError),

    /// Request body failed decoding or field checks
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Limit {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),

    #[error("Item with id: {0} does not exist")]
    NotFound(ObjectId),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// A stored document does not map onto the item shape
    #[error("Stored item is malformed: {0}")]
    DataError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_)
            | ApiError::Validation(_)
            | ApiError::InvalidQuery(_)
            | ApiError::LimitExceeded(_, _) => StatusCode::UNPROCESSABLE_ENTITY,

            ApiError::NotFound(_) => StatusCode::NOT_FOUND,

            ApiError::Store(_) | ApiError::DataError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Vec<FieldError> {
        match self {
            ApiError::Validation(errors) => errors.errors().to_vec(),
            ApiError::InvalidIdentifier(e) => vec![FieldError {
                field: "item_id".to_string(),
                message: e.to_string(),
            }],
            _ => Vec::new(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
            details: err.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
