//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every console endpoint
//! returns the same `{code, message, request_id}` shape.
//!
//! # Key invariants and assumptions
//! - `status` always agrees with `body.code`.
//! - Workflow errors map one-to-one onto status codes; see
//!   `From<WorkflowError>`.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
//! - Department mismatches arrive here already rewritten as not-found.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use crate::workflow::WorkflowError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use hrconsole::api::error::api_forbidden;
///
/// let err = api_forbidden("goal.update is not permitted");
/// assert_eq!(err.status, StatusCode::FORBIDDEN);
/// assert_eq!(err.body.code, "forbidden");
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Forbidden(message) => api_forbidden(&message),
            WorkflowError::NotFound(message) => api_not_found(&format!("{message} not found")),
            WorkflowError::Validation(message) => api_validation_error(&message),
            WorkflowError::InvalidTransition(message) => {
                api_conflict("invalid_transition", &message)
            }
            WorkflowError::Store(StoreError::Conflict(message)) => {
                api_conflict("conflict", &message)
            }
            WorkflowError::Store(err) => api_internal("storage failure", &err),
        }
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 404 Not Found error.
///
/// # Errors
/// - Does not fail.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error with a caller-provided code.
///
/// # Errors
/// - Does not fail.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, code, message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// # What it does
/// Logs the store error and returns a generic internal error response.
///
/// # Errors
/// - Does not fail.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "hrconsole storage error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 401 Unauthorized error.
///
/// # Errors
/// - Does not fail.
pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build a 403 Forbidden error.
///
/// # Errors
/// - Does not fail.
pub fn api_forbidden(message: &str) -> ApiError {
    api_error(StatusCode::FORBIDDEN, "forbidden", message)
}

/// Build a 400 Bad Request validation error.
///
/// # Errors
/// - Does not fail.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}
