use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Failure kinds of the attendance and payroll operations.
///
/// Everything except `Storage` is an expected outcome of normal use and maps
/// to a client error.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Already clocked in today")]
    AlreadyClockedIn,

    #[error("No active clock-in found for today")]
    NoActiveSession,

    #[error("Salary already paid for this period")]
    AlreadyPaid,

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CoreError {
    pub fn is_domain(&self) -> bool {
        !matches!(self, CoreError::Storage(_))
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::AlreadyClockedIn
            | CoreError::NoActiveSession
            | CoreError::InvalidPeriod(_)
            | CoreError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            CoreError::AlreadyPaid => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            CoreError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
