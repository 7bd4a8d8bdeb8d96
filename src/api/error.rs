//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreError;

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    /// Malformed input that made it past extraction.
    Unprocessable(String),
    /// The request does not fit the thread's current state.
    Conflict(String),
    /// The agent run failed.
    Agent(anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Agent(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Store(err) => {
                let status = match err {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    StoreError::Conflict(_) => StatusCode::CONFLICT,
                };
                (status, err.to_string())
            }
            ApiError::Unprocessable(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, detail),
            ApiError::Agent(err) => {
                tracing::error!("Agent run failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err))
            }
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Parse a path id, rejecting garbage with 422 instead of axum's plain 400.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Unprocessable(format!("Invalid id: {}", raw)))
}
