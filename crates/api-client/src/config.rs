//! Configuration for the FoodBridge API client
//!
//! Environment variables win over the `[api]` section of the config file,
//! which wins over built-in defaults.

use crate::error::{ApiError, ApiResult};
use foodbridge_core::config::ApiConfig;
use foodbridge_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Registry URL used when nothing else is configured
const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse a name as given in `FOODBRIDGE_ENV`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }

    /// Read from `FOODBRIDGE_ENV`
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&env::var("FOODBRIDGE_ENV").unwrap_or_default())
    }

    /// Read retry policy suited to this environment
    #[must_use]
    pub fn retry_policy(self) -> RetryConfig {
        match self {
            Self::Development => RetryConfig::quick(),
            Self::Staging => RetryConfig::default(),
            Self::Production => RetryConfig::patient(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Registry base URL, without the `/api` suffix
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy for reads; claims never retry
    pub retry: RetryConfig,
    /// Current environment
    pub environment: Environment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `FOODBRIDGE_API_URL`: registry base URL
    /// - `FOODBRIDGE_ENV`: environment (development/staging/production)
    /// - `FOODBRIDGE_TIMEOUT_SECS`: request timeout in seconds
    ///
    /// # Errors
    /// Returns a configuration error if the resulting config is invalid.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_settings(&ApiConfig::default())
    }

    /// Layer environment variables over the `[api]` config section
    ///
    /// # Errors
    /// Returns a configuration error if the resulting config is invalid.
    pub fn from_settings(api: &ApiConfig) -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url = env::var("FOODBRIDGE_API_URL")
            .ok()
            .or_else(|| api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = env::var("FOODBRIDGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(api.timeout_secs), Duration::from_secs);

        let config = Self {
            base_url,
            timeout,
            retry: environment.retry_policy(),
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns a configuration error for an empty or non-HTTP base URL or a
    /// zero timeout.
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.base_url.starts_with("http://"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("dev"), Environment::Development);
        assert_eq!(Environment::parse("STAGING"), Environment::Staging);
        assert_eq!(Environment::parse(""), Environment::Production);
        assert_eq!(Environment::Development.retry_policy().max_attempts, 3);
        assert_eq!(Environment::Production.retry_policy().max_attempts, 5);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_base_url("https://foodbridge.example.org")
            .with_timeout(Duration::from_secs(60))
            .with_retry(RetryConfig::no_retry());

        assert_eq!(config.base_url, "https://foodbridge.example.org");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default().with_base_url("ftp://x").validate().is_err());
        assert!(ClientConfig::default().with_timeout(Duration::ZERO).validate().is_err());
    }
}
