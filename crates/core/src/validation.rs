//! Input validation
//!
//! Validation failures never reach the registry: callers run these checks
//! first and surface the collected messages locally.
//!
//! # Example
//!
//! ```rust
//! use foodbridge_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("name", "Fresh bagels")
//!     .max_length("name", "Fresh bagels", 100)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use crate::model::{NewListing, NewStore, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum store name length accepted at registration
pub const MIN_STORE_NAME_LEN: usize = 3;

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate minimum length in characters
    pub fn min_length(mut self, field: &str, value: &str, min: usize) -> Self {
        let len = value.chars().count();
        if len < min {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be at least {} characters", min),
                code: "MIN_LENGTH".to_string(),
                expected: Some(format!(">= {} chars", min)),
                actual: Some(format!("{} chars", len)),
            });
        }
        self
    }

    /// Validate maximum length in characters
    pub fn max_length(mut self, field: &str, value: &str, max: usize) -> Self {
        let len = value.chars().count();
        if len > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be at most {} characters", max),
                code: "MAX_LENGTH".to_string(),
                expected: Some(format!("<= {} chars", max)),
                actual: Some(format!("{} chars", len)),
            });
        }
        self
    }

    /// Validate a numeric range (NaN always fails)
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if !(value >= min && value <= max) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {} and {}", min, max),
                code: "RANGE".to_string(),
                expected: Some(format!("{} - {}", min, max)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Validate a listing before the registry stores it
pub fn validate_new_listing(listing: &NewListing, now: DateTime<Utc>) -> ValidationResult {
    let description = listing.description.as_deref().unwrap_or("");
    Validator::new()
        .required("name", &listing.name)
        .max_length("name", &listing.name, MAX_NAME_LEN)
        .max_length("description", description, MAX_DESCRIPTION_LEN)
        .custom("expiration_date", || {
            (listing.expiration_date <= now).then(|| "Must be in the future".to_string())
        })
        .validate()
}

/// Validate a store registration
pub fn validate_new_store(store: &NewStore) -> ValidationResult {
    Validator::new()
        .required("name", &store.name)
        .min_length("name", store.name.trim(), MIN_STORE_NAME_LEN)
        .max_length("name", &store.name, MAX_NAME_LEN)
        .range("latitude", store.latitude, -90.0, 90.0)
        .range("longitude", store.longitude, -180.0, 180.0)
        .validate()
}

/// Normalize a claimer display name.
///
/// The name is informational: blank input becomes `None`. Only the
/// configured bounds can reject it, and the default minimum is zero.
///
/// # Errors
/// Returns a validation error when the trimmed name is shorter than
/// `min_len` or longer than `max_len` characters.
pub fn normalize_claimer_name(
    name: Option<&str>,
    min_len: usize,
    max_len: usize,
) -> Result<Option<String>> {
    let trimmed = name.map(str::trim).unwrap_or("");

    Validator::new()
        .min_length("claimer_name", trimmed, min_len)
        .max_length("claimer_name", trimmed, max_len)
        .validate()
        .to_result()?;

    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
