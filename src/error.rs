// Error handling module for the listings gateway
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::bookings::BookingError;
use crate::client::ClientError;
use crate::search::session::SessionError;

/// Main error type for the API
/// All handlers should return Result<T, ApiError>
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed query parameters
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Action not allowed in the current state (busy search, booking policy)
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// The remote API failed or rejected the call
    /// Client errors keep their status; everything else is 502 Bad Gateway
    Upstream {
        status: StatusCode,
        message: String,
        source: ClientError,
    },

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    InternalError(String),

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Authorization failures
    /// Maps to HTTP 403 Forbidden
    Forbidden(String),
}

/// Consistent error response structure
///
/// Provides both a machine-readable error code and a human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "UPSTREAM_ERROR")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Wraps an upstream failure, showing the upstream message or `fallback`
    pub fn upstream(source: ClientError, fallback: &str) -> Self {
        let message = source.user_message(fallback);
        ApiError::Upstream {
            status: passthrough_status(&source),
            message,
            source,
        }
    }

    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logging levels:
    /// - error!: upstream outages and internal errors
    /// - warn!: conflicts and authentication/authorization failures
    /// - debug!: expected client errors (validation, not found)
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                let mut response = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed");
                response.details = Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (StatusCode::BAD_REQUEST, response)
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("BAD_REQUEST", message.clone()))
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id)),
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (StatusCode::CONFLICT, ErrorResponse::new("CONFLICT", message.clone()))
            }
            ApiError::Upstream { status, message, source } => {
                if status.is_client_error() {
                    debug!("Upstream rejected request ({}): {}", status, source);
                } else {
                    error!("Upstream failure: {}", source);
                }
                (*status, ErrorResponse::new("UPSTREAM_ERROR", message.clone()))
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred"),
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("UNAUTHORIZED", message.clone()))
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (StatusCode::FORBIDDEN, ErrorResponse::new("FORBIDDEN", message.clone()))
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Upstream { status, .. } => *status,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Upstream 4xx statuses pass through; anything else is a bad gateway
fn passthrough_status(source: &ClientError) -> StatusCode {
    source
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .filter(|s| s.is_client_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// Rejected search session actions
impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::BlankQuery => ApiError::BadRequest(error.to_string()),
            SessionError::SearchInProgress
            | SessionError::LoadMoreInProgress
            | SessionError::NoActiveSearch => ApiError::Conflict {
                message: error.to_string(),
            },
        }
    }
}

/// Booking policy, filter and upstream errors
impl From<BookingError> for ApiError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::NotAllowed(message) => ApiError::Conflict { message },
            BookingError::InvalidFilter(message) => ApiError::BadRequest(message),
            BookingError::NotFound(id) => ApiError::NotFound {
                resource: "Booking".to_string(),
                id,
            },
            BookingError::Upstream { message, source } => ApiError::Upstream {
                status: passthrough_status(&source),
                message,
                source,
            },
        }
    }
}

/// Token and role failures
impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InsufficientPermissions { .. } => ApiError::Forbidden(error.to_string()),
            _ => ApiError::Unauthorized(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_client_error_keeps_status() {
        let err = ApiError::upstream(
            ClientError::from_status(409, br#"{"message":"Room unavailable"}"#),
            "Failed to update booking",
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let (_, body) = err.to_error_response();
        assert_eq!(body.message, "Room unavailable");
        assert_eq!(body.error_code, "UPSTREAM_ERROR");
    }

    #[test]
    fn test_upstream_server_error_is_bad_gateway() {
        let err = ApiError::upstream(ClientError::from_status(500, b""), "Could not get AI response. Try again.");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        let (_, body) = err.to_error_response();
        assert_eq!(body.message, "Could not get AI response. Try again.");
    }

    #[test]
    fn test_session_errors() {
        assert_eq!(ApiError::from(SessionError::BlankQuery).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(SessionError::SearchInProgress).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_booking_errors() {
        let not_allowed = ApiError::from(BookingError::NotAllowed("too late".into()));
        assert_eq!(not_allowed.status_code(), StatusCode::CONFLICT);

        let not_found = ApiError::from(BookingError::NotFound("b1".into()));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(ApiError::from(AuthError::MissingToken).status_code(), StatusCode::UNAUTHORIZED);
        let forbidden = AuthError::InsufficientPermissions {
            required: crate::auth::Role::Admin,
            actual: crate::auth::Role::User,
        };
        assert_eq!(ApiError::from(forbidden).status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_validation_error_has_details() {
        let err = ApiError::ValidationError(validator::ValidationErrors::new());
        let (status, body) = err.to_error_response();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.details.is_some());
    }
}
