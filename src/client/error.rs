use serde::Deserialize;

/// Error types for calls to the remote Hotel and Booking APIs
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned status {status}")]
    Upstream { status: u16, message: Option<String> },

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Could not decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body shape used by the remote API
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

impl ClientError {
    /// Builds an `Upstream` error from a non-success status and its raw body
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<UpstreamErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        ClientError::Upstream { status, message }
    }

    /// Short message for the user: the upstream `message` if any, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Upstream { message: Some(message), .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Upstream status code, when the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Upstream { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_upstream_message() {
        let err = ClientError::from_status(400, br#"{"message":"Booking already cancelled"}"#);
        assert_eq!(err.user_message("Failed to cancel booking"), "Booking already cancelled");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = ClientError::from_status(500, b"<html>oops</html>");
        assert_eq!(
            err.user_message("Could not get AI response. Try again."),
            "Could not get AI response. Try again."
        );

        let blank = ClientError::from_status(500, br#"{"message":"  "}"#);
        assert_eq!(blank.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_not_found() {
        assert!(ClientError::from_status(404, b"").is_not_found());
        assert!(!ClientError::from_status(500, b"").is_not_found());
    }
}
