//! Error handling with codes, context and recovery suggestions
//!
//! Every failure that crosses a crate boundary is an [`Error`] carrying an
//! [`ErrorCode`]. The code decides the [`FailureKind`] a caller reacts to:
//! validation problems stay local, not-found and conflict both mean "this
//! item is no longer available", and transport failures are retryable for
//! reads only.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,
    Timeout = 1003,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,

    // Listing errors (4xxx)
    ListingNotFound = 4001,
    AlreadyClaimed = 4002,
    ListingExpired = 4003,
    StoreNotFound = 4004,
    NotClaimed = 4005,

    // Transport errors (5xxx)
    TransportError = 5000,
    UnexpectedResponse = 5001,

    // Validation errors (6xxx)
    ValidationError = 6000,
    InvalidInput = 6001,
    InvalidCoordinate = 6002,
    ConstraintViolation = 6003,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Listing",
            5 => "Transport",
            6 => "Validation",
            _ => "Unknown",
        }
    }

    /// The failure kind a caller reacts to
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ListingNotFound | Self::StoreNotFound => FailureKind::NotFound,
            Self::AlreadyClaimed | Self::ListingExpired | Self::NotClaimed => FailureKind::Conflict,
            Self::Timeout | Self::TransportError | Self::UnexpectedResponse => FailureKind::Transport,
            Self::ValidationError
            | Self::InvalidInput
            | Self::InvalidCoordinate
            | Self::ConstraintViolation => FailureKind::Validation,
            Self::Unknown
            | Self::Internal
            | Self::IoError
            | Self::FileNotFound
            | Self::ConfigError
            | Self::ConfigNotFound
            | Self::ConfigParseError
            | Self::ConfigValidationError => FailureKind::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Coarse failure taxonomy surfaced to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed input; never reaches the registry
    Validation,
    /// The target listing does not exist
    NotFound,
    /// The target listing was already claimed or has expired
    Conflict,
    /// Network, timeout or unexpected server failure
    Transport,
    /// Local configuration or IO problem
    Internal,
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The failure kind for this error
    pub fn kind(&self) -> FailureKind {
        self.code.kind()
    }

    /// Whether the operation that produced this error may be retried freely.
    ///
    /// Only meaningful for reads; claims are never retried automatically.
    pub fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::Transport
    }

    /// Text shown to the person using the app.
    ///
    /// Not-found and conflict share one message; the distinction is kept
    /// for logs only.
    pub fn user_message(&self) -> String {
        match self.kind() {
            FailureKind::NotFound | FailureKind::Conflict => {
                "This item is no longer available".to_string()
            }
            FailureKind::Transport => "The request failed. Please try again.".to_string(),
            FailureKind::Validation => self.message.clone(),
            FailureKind::Internal => format!("Something went wrong: {}", self.message),
        }
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            kind: self.kind(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a foodbridge.toml file or use --config to specify a path")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, format!("{}: {}", field, message.into()))
    }

    pub fn listing_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ListingNotFound, format!("Listing not found: {}", id))
    }

    pub fn store_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::StoreNotFound, format!("Store not found: {}", id))
    }

    pub fn already_claimed(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::AlreadyClaimed, format!("Listing already claimed: {}", id))
    }

    pub fn listing_expired(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ListingExpired, format!("Listing expired: {}", id))
    }

    pub fn not_claimed(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NotClaimed, format!("Listing has not been claimed: {}", id))
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportError, message)
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self::new(ErrorCode::Timeout, format!("Request timed out after {:?}", after))
    }
}

/// Serializable error report for logging and API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UNAVAILABLE: i32 = 4;
    pub const TRANSPORT_ERROR: i32 = 5;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::UnexpectedResponse, format!("JSON parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<foodbridge_geo::GeoError> for Error {
    fn from(err: foodbridge_geo::GeoError) -> Self {
        Error::new(ErrorCode::InvalidCoordinate, err.to_string()).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
