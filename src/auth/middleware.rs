// Authentication extractors for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Role, token::TokenVerifier};

/// Authenticated user extractor for protected routes
///
/// Keeps the raw bearer token so it can be forwarded to the Booking API.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
    pub token: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let endpoint = parts.uri.path().to_string();
        let token = bearer_token(&parts.headers).map_err(|e| {
            warn!("Rejected credentials for endpoint {}: {}", endpoint, e);
            e
        })?;

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let claims = verifier.verify(token)?;

        debug!("Authenticated user_id={} role={} endpoint={}", claims.sub, claims.role, endpoint);
        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role: claims.role,
            token: token.to_string(),
        })
    }
}

/// Role requirement checked against an authenticated user
#[derive(Debug, Clone)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    /// Requirement for admin-only endpoints
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    pub fn authorize(&self, user: &AuthenticatedUser) -> Result<(), AuthError> {
        if user.role != self.required_role {
            warn!(
                "Authorization failed: user_id={}, required_role={}, actual_role={}",
                user.user_id, self.required_role, user.role
            );
            return Err(AuthError::InsufficientPermissions {
                required: self.required_role,
                actual: user.role,
            });
        }
        Ok(())
    }
}

/// Authenticated user holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        RequireRole::admin().authorize(&user)?;
        Ok(AdminUser(user))
    }
}
