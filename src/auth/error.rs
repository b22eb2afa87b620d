// Authentication and authorization error types

use axum::response::{IntoResponse, Response};
use std::fmt;

use crate::auth::models::Role;
use crate::error::ApiError;

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    // Authentication errors
    InvalidToken,
    ExpiredToken,
    MissingToken,

    // Authorization errors
    /// User lacks required permissions for the operation
    /// Contains the required role and the user's actual role
    InsufficientPermissions { required: Role, actual: Role },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InsufficientPermissions { required, .. } => {
                write!(f, "Insufficient permissions: required role '{}'", required)
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Rendered through `ApiError` so every endpoint shares one error body
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
