//! Client error types

use crate::types::ErrorBody;
use singularity_core::CoreError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

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

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The access token could not be refreshed; the session has been cleared
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] Box<ClientError>),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Session storage or validation failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
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

    /// Whether the server rejected the credentials (HTTP 401)
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Message the server gave for the failure
    ///
    /// The backend answers errors with `{"detail": "..."}`. Bodies in any
    /// other shape, and failures without a response, give `None`.
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            Self::BadRequest(body)
            | Self::AuthenticationFailed(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::ServerError { message: body, .. } => body,
            Self::Core(CoreError::Validation { message }) => return Some(message.clone()),
            _ => return None,
        };

        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|e| e.detail)
            .filter(|detail| !detail.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_REQUEST, String::new()),
            ClientError::BadRequest(_)
        ));
        assert!(ClientError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_auth_expired());
        assert!(matches!(
            ClientError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ClientError::ServerError { status: 429, .. }
        ));
    }

    #[test]
    fn test_detail_from_error_body() {
        let error = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Invalid credentials"}"#.to_string(),
        );
        assert_eq!(error.detail().as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_detail_ignores_other_bodies() {
        let error = ClientError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        );
        assert_eq!(error.detail(), None);
        assert_eq!(error.status(), Some(500));

        let blank = ClientError::from_status(StatusCode::BAD_REQUEST, r#"{"detail":""}"#.to_string());
        assert_eq!(blank.detail(), None);
    }

    #[test]
    fn test_refresh_failure_keeps_inner_status() {
        let inner = ClientError::from_status(StatusCode::UNAUTHORIZED, String::new());
        let error = ClientError::RefreshFailed(Box::new(inner));
        assert_eq!(error.status(), Some(401));
        assert!(!error.is_auth_expired());
    }
}
