//! API Error Types
//!
//! Maps core errors onto HTTP responses. Eligibility failures ("not
//! eligible yet") carry their own codes so clients can tell them apart
//! from data errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use upline_core::CoreError;

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation error
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    /// Conflict (stale transition, graph violation)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Core engine error
    #[error("Core error: {0}")]
    CoreError(#[from] CoreError),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CoreError(core) => match core {
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::Validation { .. }
                | CoreError::InvalidAmount { .. }
                | CoreError::InvalidSchedule { .. }
                | CoreError::ScheduleRateMissing { .. }
                | CoreError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
                CoreError::ReferralCycle { .. }
                | CoreError::StaleTransition { .. }
                | CoreError::RankPeriodNotStarted { .. }
                | CoreError::RankNotReached { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
            ApiError::CoreError(core) => match core {
                CoreError::NotFound { .. } => "NOT_FOUND",
                CoreError::Validation { .. } => "VALIDATION_ERROR",
                CoreError::InvalidAmount { .. } => "INVALID_AMOUNT",
                CoreError::InvalidSchedule { .. } | CoreError::ScheduleRateMissing { .. } => {
                    "INVALID_SCHEDULE"
                }
                CoreError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
                CoreError::ReferralCycle { .. } | CoreError::CorruptReferralChain { .. } => {
                    "INVALID_GRAPH_OPERATION"
                }
                CoreError::StaleTransition { .. } => "STALE_TRANSITION",
                CoreError::RankPeriodNotStarted { .. } => "RANK_PERIOD_NOT_STARTED",
                CoreError::RankNotReached { .. } => "RANK_NOT_REACHED",
                CoreError::MissingWithdrawalBucket { .. }
                | CoreError::Storage(_)
                | CoreError::Internal(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}
