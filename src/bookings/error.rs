use crate::client::ClientError;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    NotAllowed(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: ClientError,
    },
}

impl BookingError {
    /// Wraps an upstream failure with the message shown to the user
    pub fn upstream(source: ClientError, fallback: &str) -> Self {
        BookingError::Upstream {
            message: source.user_message(fallback),
            source,
        }
    }

    /// Maps a failed lookup of booking `id`; a 404 becomes `NotFound`
    pub fn lookup(source: ClientError, id: &str) -> Self {
        if source.is_not_found() {
            BookingError::NotFound(id.to_string())
        } else {
            Self::upstream(source, "Failed to load booking")
        }
    }
}
