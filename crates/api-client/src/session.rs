//! Caller identity passed explicitly to the client

use std::env;
use std::fmt;

/// Credentials for registry requests
///
/// Recipients may search and claim anonymously. A bearer token is only
/// attached when one was supplied.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// A session without credentials
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session that sends `Authorization: Bearer <token>`
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    /// Read the token from `FOODBRIDGE_TOKEN`, if set
    #[must_use]
    pub fn from_env() -> Self {
        env::var("FOODBRIDGE_TOKEN").map_or_else(|_| Self::anonymous(), Self::bearer)
    }

    /// Value for the `Authorization` header
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
