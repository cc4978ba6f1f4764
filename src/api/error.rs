//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::{IngestError, LedgerError};

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    CapacityExceeded(String),
    NotFound(String),
    RateLimited,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CapacityExceeded(_) => StatusCode::INSUFFICIENT_STORAGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::CapacityExceeded(msg) | Self::NotFound(msg) => {
                msg.clone()
            }
            Self::RateLimited => "Rate limit exceeded".to_string(),
            // Details stay in the server log
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) | LedgerError::InvalidRecord(e) => {
                Self::Validation(e.to_string())
            }
            e @ LedgerError::CapacityExceeded { .. } => Self::CapacityExceeded(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse(msg) => Self::Validation(format!("XML parsing error: {}", msg)),
            IngestError::Ledger(e) => e.into(),
            e @ IngestError::Io { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!("Request failed: {}", detail);
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
