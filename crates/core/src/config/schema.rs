//! Configuration schema definitions

use foodbridge_geo::DistanceUnit;
use serde::{Deserialize, Serialize};

use crate::claim_code::DEFAULT_CODE_LEN;
use crate::error::{Error, ErrorCode, Result};
use crate::model::{MAX_CLAIM_CODE_LEN, MAX_NAME_LEN};

/// Smallest search radius accepted after clamping
pub const MIN_RADIUS: f64 = 1.0;

/// Largest search radius accepted after clamping
pub const MAX_RADIUS: f64 = 50.0;

/// Radius used when none (or a non-numeric one) is given
pub const DEFAULT_RADIUS: f64 = 10.0;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub claim: ClaimConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

impl ConfigSchema {
    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        let radius = self.search.default_radius;
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&radius) {
            return Err(Error::new(
                ErrorCode::ConfigValidationError,
                format!("search.default_radius must be between {MIN_RADIUS} and {MAX_RADIUS}, got {radius}"),
            ));
        }
        if self.claim.min_name_length > self.claim.max_name_length {
            return Err(Error::new(
                ErrorCode::ConfigValidationError,
                "claim.min_name_length cannot exceed claim.max_name_length",
            ));
        }
        if !(1..=MAX_CLAIM_CODE_LEN).contains(&self.claim.code_length) {
            return Err(Error::new(
                ErrorCode::ConfigValidationError,
                format!("claim.code_length must be between 1 and {MAX_CLAIM_CODE_LEN}"),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::new(
                ErrorCode::ConfigValidationError,
                "api.timeout_secs cannot be zero",
            ));
        }
        Ok(())
    }
}

/// Nearby search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius used when the caller supplies none
    #[serde(default = "default_radius")]
    pub default_radius: f64,

    /// Unit for radius and distances
    #[serde(default)]
    pub unit: DistanceUnit,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius: default_radius(),
            unit: DistanceUnit::default(),
        }
    }
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

/// Claim handshake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimConfig {
    /// Minimum claimer name length; zero keeps the name optional
    #[serde(default)]
    pub min_name_length: usize,

    /// Maximum claimer name length
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Pickup code length used by the in-memory registry
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            min_name_length: 0,
            max_name_length: default_max_name_length(),
            code_length: default_code_length(),
        }
    }
}

fn default_max_name_length() -> usize {
    MAX_NAME_LEN
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LEN
}

/// Remote registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the registry; environment variables take precedence
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
