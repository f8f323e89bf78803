//! Search radius input handling.
//!
//! Out-of-range radii are clamped into `[1, 50]`, never rejected. Only a
//! radius that is not a number at all is a validation error.

use foodbridge_core::config::{DEFAULT_RADIUS, MAX_RADIUS, MIN_RADIUS};
use foodbridge_core::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};

/// A radius already clamped into the accepted range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Clamp `value` into `[1, 50]`.
    ///
    /// # Errors
    /// Returns a validation error for NaN or infinite input.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::new(
                ErrorCode::InvalidInput,
                format!("radius: expected a number, got {value}"),
            ));
        }
        Ok(Self(value.clamp(MIN_RADIUS, MAX_RADIUS)))
    }

    /// Lenient parse of free-form text input.
    ///
    /// Reads a leading integer the way a text box would (`"12.7"` is 12,
    /// `"15 miles"` is 15). Non-numeric input and zero fall back to the
    /// default radius; anything else is clamped.
    pub fn from_input(input: &str) -> Self {
        match leading_integer(input) {
            Some(n) if n != 0 => Self((n as f64).clamp(MIN_RADIUS, MAX_RADIUS)),
            _ => Self(DEFAULT_RADIUS),
        }
    }

    /// The clamped value
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_RADIUS)
    }
}

impl std::fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn leading_integer(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    let number = digits.get(..end).filter(|d| !d.is_empty())?;
    // Absurdly long digit strings saturate rather than fail
    let parsed = number.parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * parsed)
}
