use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use petal_db::StoreError;
use petal_types::api::ErrorResponse;

use crate::validation::ValidationError;

/// Seconds a client should wait before retrying a write that hit a missing
/// actor identity.
pub const RETRY_AFTER_SECS: u32 = 2;

/// Which store call failed, for the generic failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
    List,
}

impl Operation {
    fn failure_message(&self) -> &'static str {
        match self {
            Self::Create => "Could not create bouquet.",
            Self::Get => "Could not load bouquet.",
            Self::List => "Could not load the garden.",
        }
    }

    fn failure_code(&self) -> &'static str {
        match self {
            Self::Create => "create_failed",
            Self::Get => "get_failed",
            Self::List => "list_failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid pagination cursor")]
    InvalidCursor,

    /// Recoverable: the client should retry shortly.
    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("{} failed", .0.failure_code())]
    Failed(Operation),

    /// Body or query string axum could not extract.
    #[error("Rejected request: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    /// Map a store failure. Transport-level detail is logged here and never
    /// reaches the client.
    pub fn store(op: Operation, err: StoreError) -> Self {
        match err {
            StoreError::InvalidCursor => Self::InvalidCursor,
            StoreError::PreconditionNotMet(reason) => Self::NotReady(reason),
            other => {
                error!("Store {:?} failed: {}", op, other);
                Self::Failed(op)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCursor => StatusCode::BAD_REQUEST,
            Self::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn body(&self) -> ErrorResponse {
        let (error, message) = match self {
            Self::NotFound => ("not_found", "Bouquet not found.".to_string()),
            Self::Validation(e) => (e.code(), e.to_string()),
            Self::InvalidCursor => ("invalid_cursor", "Invalid pagination cursor.".to_string()),
            Self::NotReady(_) => (
                "not_ready",
                "We're getting things ready. Please try again in a moment.".to_string(),
            ),
            Self::Failed(op) => (op.failure_code(), op.failure_message().to_string()),
            Self::Rejected { message, .. } => ("invalid_request", message.clone()),
        };
        ErrorResponse {
            error: error.to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();
        if matches!(self, Self::NotReady(_)) {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let not_ready = ApiError::store(Operation::Create, StoreError::precondition("signing in"));
        assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);

        let cursor = ApiError::store(Operation::List, StoreError::InvalidCursor);
        assert_eq!(cursor.status(), StatusCode::BAD_REQUEST);

        let failed = ApiError::store(
            Operation::Create,
            StoreError::Remote { status: 503, body: "quota".into() },
        );
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.body().message, "Could not create bouquet.");
    }

    #[test]
    fn not_ready_sets_retry_after() {
        let response = ApiError::NotReady("signing in".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }
}
