// Authentication module
// Verifies identity provider bearer tokens and enforces the admin role

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser, RequireRole};
pub use models::Role;
pub use token::{Claims, TokenVerifier};
