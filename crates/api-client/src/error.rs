//! Error types for the API client

use foodbridge_core::{Error, ErrorCode};
use std::fmt;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Response parsed but did not carry what we need
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Config(_)
            | Self::Json(_)
            | Self::MalformedResponse(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// The core error code this failure maps onto
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ApiResponse { status, .. } => match status {
                404 => ErrorCode::ListingNotFound,
                409 => ErrorCode::AlreadyClaimed,
                410 => ErrorCode::ListingExpired,
                400 | 422 => ErrorCode::ValidationError,
                _ => ErrorCode::TransportError,
            },
            Self::Request(e) if e.is_timeout() => ErrorCode::Timeout,
            Self::Request(_) | Self::RetriesExhausted { .. } => ErrorCode::TransportError,
            Self::Json(_) | Self::MalformedResponse(_) => ErrorCode::UnexpectedResponse,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        let code = err.error_code();
        match err {
            ApiError::ApiResponse { status, message } => {
                let message = if message.trim().is_empty() {
                    format!("Registry responded with status {status}")
                } else {
                    message
                };
                Error::new(code, message)
            }
            other => Error::new(code, other.to_string()).with_source(other),
        }
    }
}

/// Error context for better debugging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Request ID for correlation
    pub request_id: Option<String>,
    /// Endpoint that was called
    pub endpoint: String,
    /// HTTP method used
    pub method: String,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)?;
        if let Some(ref id) = self.request_id {
            write!(f, " (request_id: {id})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodbridge_core::FailureKind;

    fn kind_for(status: u16) -> FailureKind {
        Error::from(ApiError::api_response(status, "nope")).kind()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(kind_for(404), FailureKind::NotFound);
        assert_eq!(kind_for(409), FailureKind::Conflict);
        assert_eq!(kind_for(410), FailureKind::Conflict);
        assert_eq!(kind_for(400), FailureKind::Validation);
        assert_eq!(kind_for(422), FailureKind::Validation);
        assert_eq!(kind_for(500), FailureKind::Transport);
        assert_eq!(kind_for(503), FailureKind::Transport);
        assert_eq!(kind_for(401), FailureKind::Transport);
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::api_response(503, "").is_retryable());
        assert!(ApiError::api_response(429, "").is_retryable());
        assert!(!ApiError::api_response(404, "").is_retryable());
        assert!(!ApiError::MalformedResponse("x".into()).is_retryable());
    }

    #[test]
    fn test_empty_body_message() {
        let err = Error::from(ApiError::api_response(409, "  "));
        assert_eq!(err.code, ErrorCode::AlreadyClaimed);
        assert!(err.message.contains("409"));
    }

    #[test]
    fn test_malformed_is_transport() {
        let err = Error::from(ApiError::MalformedResponse("missing claimCode".into()));
        assert_eq!(err.code, ErrorCode::UnexpectedResponse);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext {
            request_id: Some("abc".into()),
            endpoint: "/api/Recipient/claim/1".into(),
            method: "POST".into(),
        };
        assert_eq!(ctx.to_string(), "POST /api/Recipient/claim/1 (request_id: abc)");
    }
}
