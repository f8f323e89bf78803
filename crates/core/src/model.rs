//! Domain types: stores, listings and claim receipts
//!
//! A [`Listing`] is one unit of donated food owned by a [`Store`]. It is
//! *available* while it is unclaimed and its expiration date lies in the
//! future. Claimed and expired are both terminal.

use chrono::{DateTime, Utc};
use foodbridge_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, ErrorCode, Result};

/// Maximum listing/store name length
pub const MAX_NAME_LEN: usize = 100;

/// Maximum listing description length
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum pickup code length
pub const MAX_CLAIM_CODE_LEN: usize = 10;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an id from user input.
            ///
            /// # Errors
            /// Returns a validation error when the input is empty or not a UUID.
            pub fn parse(input: &str) -> Result<Self> {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Err(Error::new(
                        ErrorCode::InvalidInput,
                        concat!("Missing ", $label, " id"),
                    ));
                }
                Uuid::parse_str(trimmed).map(Self).map_err(|e| {
                    Error::new(
                        ErrorCode::InvalidInput,
                        format!(concat!("Invalid ", $label, " id '{}'"), trimmed),
                    )
                    .with_source(e)
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }
    };
}

id_type!(
    /// Opaque listing identity assigned by the registry
    ListingId,
    "listing"
);

id_type!(
    /// Opaque store identity assigned by the registry
    StoreId,
    "store"
);

/// A physical donation origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// `None` when the registry has no usable coordinates for the store
    pub location: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Store {
    pub fn new(id: StoreId, name: impl Into<String>, location: Option<Coordinate>) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            created_at: None,
        }
    }
}

/// Where a listing stands at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingState {
    Available,
    Claimed,
    Expired,
}

/// A unit of donated food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expiration_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub claimed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_code: Option<String>,
    /// Set by the donor once a claimed item has been collected
    #[serde(default)]
    pub picked_up: bool,
    pub store_id: StoreId,
    /// Owning store as embedded by the registry for search responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
}

impl Listing {
    /// True when the expiration date is at or before `now`
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date <= now
    }

    /// True when the listing can still be claimed at `now`
    #[inline]
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        !self.claimed && !self.is_expired(now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> ListingState {
        if self.claimed {
            ListingState::Claimed
        } else if self.is_expired(now) {
            ListingState::Expired
        } else {
            ListingState::Available
        }
    }

    /// Coordinates of the owning store, if the registry supplied them
    #[inline]
    pub fn store_location(&self) -> Option<Coordinate> {
        self.store.as_ref().and_then(|s| s.location)
    }

    /// Display name of the owning store
    pub fn store_name(&self) -> Option<&str> {
        self.store.as_ref().map(|s| s.name.as_str())
    }
}

/// What a successful claim hands back to the claimer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub listing_id: ListingId,
    pub pickup_code: String,
}

/// Fields a donor supplies when listing an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub expiration_date: DateTime<Utc>,
}

/// Fields a donor supplies when registering a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStore {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(expires_in: Duration, claimed: bool) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(),
            name: "Sourdough loaves".to_string(),
            description: None,
            expiration_date: now + expires_in,
            created_at: now,
            claimed,
            claim_code: claimed.then(|| "ABC123".to_string()),
            picked_up: false,
            store_id: StoreId::new(),
            store: None,
        }
    }

    #[test]
    fn test_availability() {
        let now = Utc::now();
        assert!(listing(Duration::hours(24), false).is_available(now));
        assert!(!listing(Duration::hours(24), true).is_available(now));
        assert!(!listing(Duration::hours(-1), false).is_available(now));
    }

    #[test]
    fn test_expired_at_exact_instant() {
        let mut l = listing(Duration::hours(1), false);
        let now = l.expiration_date;
        assert!(l.is_expired(now));
        l.expiration_date = now + Duration::milliseconds(1);
        assert!(!l.is_expired(now));
    }

    #[test]
    fn test_state() {
        let now = Utc::now();
        assert_eq!(listing(Duration::hours(1), false).state(now), ListingState::Available);
        assert_eq!(listing(Duration::hours(-1), true).state(now), ListingState::Claimed);
        assert_eq!(listing(Duration::hours(-1), false).state(now), ListingState::Expired);
    }

    #[test]
    fn test_id_parse() {
        let id = ListingId::new();
        assert_eq!(ListingId::parse(&id.to_string()).unwrap(), id);
        assert_eq!(ListingId::parse("").unwrap_err().code, ErrorCode::InvalidInput);
        assert_eq!(ListingId::parse("   ").unwrap_err().code, ErrorCode::InvalidInput);
        assert!(ListingId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_listing_serialization_skips_absent_fields() {
        let l = listing(Duration::hours(1), false);
        let json = serde_json::to_string(&l).unwrap();
        assert!(!json.contains("claim_code"));
        let back: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, l);
    }
}
