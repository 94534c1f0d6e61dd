//! Client error types

use carelink_core::{CoreError, ValidationErrors};
use thiserror::Error;

/// Message surfaced when the session could not be renewed
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The refresh token was rejected; credentials have been wiped
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// No access token is stored and the client is configured to fail fast
    #[error("Not logged in")]
    NotAuthenticated,

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Credentials(#[from] CoreError),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Registration attempted with an address that already has an account
    #[error("This email is already used. Please use a different email address.")]
    EmailInUse(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Form input rejected before anything was sent
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Header name or value that cannot be sent
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Build an error from a failed response body, preferring the backend's `detail` field
    pub fn from_body(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
        let message = match detail {
            Some(detail) => detail,
            None if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            None => body.trim().to_string(),
        };
        Self::from_status(status, message)
    }

    /// True when the caller must log in again before retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn session_expired_message_is_stable() {
        assert_eq!(
            ClientError::SessionExpired.to_string(),
            "Session expired. Please log in again."
        );
    }

    #[test]
    fn detail_field_wins() {
        let err = ClientError::from_body(StatusCode::NOT_FOUND, r#"{"detail":"Booking not found"}"#);
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "Booking not found"));
    }

    #[test]
    fn plain_body_and_empty_body() {
        let err = ClientError::from_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ClientError::ServerError { status: 502, ref message } if message == "upstream down"));

        let err = ClientError::from_body(StatusCode::FORBIDDEN, "");
        assert!(matches!(err, ClientError::Forbidden(ref m) if m == "Forbidden"));
    }
}
