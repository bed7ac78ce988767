//! Error types for web handlers.
//!
//! Bridges domain errors and HTTP responses, implementing Axum's
//! `IntoResponse` trait. The marketplace service is the only source of
//! user-facing failures; this module just assigns statuses and codes.

use crate::aggregates::{BookingError, CollaborationError, DirectoryError, InventoryError};
use crate::app::ServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly error responses.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    #[allow(dead_code)]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), code.into())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Inventory(inner) => match inner {
                InventoryError::SoldOut(_) => Self::conflict(message, "SOLD_OUT"),
                InventoryError::UnknownEvent(id) => Self::not_found("Event inventory", id),
                InventoryError::AlreadyOpen(_) | InventoryError::ZeroCapacity => {
                    Self::validation(message)
                },
            },
            ServiceError::Collaboration(inner) => match inner {
                CollaborationError::EmptyMessage
                | CollaborationError::TooManyDishes(_)
                | CollaborationError::DuplicateRequest(_) => Self::validation(message),
                CollaborationError::UnknownRequest(id) => {
                    Self::not_found("Collaboration request", id)
                },
                CollaborationError::InvalidTransition(..) => {
                    Self::conflict(message, "INVALID_TRANSITION")
                },
            },
            ServiceError::Directory(inner) => match inner {
                DirectoryError::EmptyTitle
                | DirectoryError::EmptyCuisine
                | DirectoryError::DuplicateEvent(_) => Self::validation(message),
                DirectoryError::UnknownEvent(id) => Self::not_found("Event", id),
                DirectoryError::CookAlreadyAssigned { .. }
                | DirectoryError::AlreadyCancelled(_) => {
                    Self::conflict(message, "INVALID_TRANSITION")
                },
            },
            ServiceError::Booking(inner) => match inner {
                BookingError::UnknownRequest(id) => Self::not_found("Seat request", id),
                BookingError::AlreadyRequested(_) => Self::conflict(message, "ALREADY_REQUESTED"),
                BookingError::InvalidTransition(..) => {
                    Self::conflict(message, "INVALID_TRANSITION")
                },
                BookingError::DuplicateRequest(_) => Self::validation(message),
            },
            ServiceError::EventCancelled(_) => Self::conflict(message, "EVENT_CANCELLED"),
            ServiceError::Forbidden => Self::forbidden(message),
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Internal server error"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventId;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn sold_out_maps_to_conflict() {
        let err: AppError = ServiceError::from(InventoryError::SoldOut(EventId::new())).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "SOLD_OUT");
    }

    #[test]
    fn validation_maps_to_unprocessable() {
        let err: AppError = ServiceError::from(InventoryError::ZeroCapacity).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
