//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type. Each variant maps to a
//! specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::{EventId, ValidationErrors};
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid event data: start_time: must be in the future",
///     "details": [{ "field": "start_time", "message": "must be in the future" }]
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code (see [`ServiceError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Field-level failures, when there are any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category     | HTTP Status                           |
/// |-----------|--------------|---------------------------------------|
/// | 1000–1999 | Validation   | 400 Bad Request                       |
/// | 2000–2999 | Not Found    | 404 Not Found                         |
/// | 3000–3999 | Storage      | 500 Internal / 503 Service Unavailable |
/// | 4000–4999 | Registration | 400 Bad Request                       |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The event has no open slot left.
    #[error("event {event_id} is at maximum capacity ({max_capacity})")]
    EventCapacityExceeded {
        /// Event that is full.
        event_id: EventId,
        /// Its configured capacity.
        max_capacity: u32,
    },

    /// The email is already registered for this event.
    #[error("{email} is already registered for this event")]
    DuplicateRegistration {
        /// The rejected email address.
        email: String,
    },

    /// Event creation input violated one or more invariants.
    #[error("invalid event data: {0}")]
    InvalidEventData(ValidationErrors),

    /// Request input could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Registration or paging input failed field validation.
    #[error("invalid input: {0}")]
    InvalidInput(ValidationErrors),

    /// The storage layer failed inside a registration unit; nothing was
    /// committed and the caller may retry.
    #[error("registration failed: {0}")]
    RegistrationFailed(#[source] StoreError),

    /// The storage layer failed outside a registration.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidEventData(_) => 1002,
            Self::InvalidInput(_) => 1003,
            Self::EventNotFound(_) => 2001,
            Self::Storage(_) => 3001,
            Self::RegistrationFailed(_) => 3002,
            Self::EventCapacityExceeded { .. } => 4001,
            Self::DuplicateRegistration { .. } => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidEventData(_)
            | Self::InvalidInput(_)
            | Self::EventCapacityExceeded { .. }
            | Self::DuplicateRegistration { .. } => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) => StatusCode::NOT_FOUND,
            Self::RegistrationFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if repeating the same request may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::RegistrationFailed(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let details = match &self {
            Self::InvalidEventData(errors) | Self::InvalidInput(errors) => Some(errors.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
