//! Core domain for FoodBridge
//!
//! This crate provides what every other FoodBridge crate builds on:
//!
//! - **Domain model**: stores, listings, availability and claim receipts
//! - **Error handling**: coded errors mapped onto a small failure taxonomy
//! - **Registry boundary**: the [`registry::ListingRegistry`] trait and an
//!   in-memory implementation with an atomic claim
//! - **Configuration**: TOML-based configuration with validation
//! - **Validation**: listing, store and claimer-name checks
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use foodbridge_core::prelude::*;
//!
//! let registry = InMemoryRegistry::new();
//! let store = registry.register_store(NewStore {
//!     name: "Corner Grocer".into(),
//!     latitude: 40.7128,
//!     longitude: -74.0060,
//! })?;
//! let listing = registry.add_listing(store.id, NewListing {
//!     name: "Bananas".into(),
//!     description: Some("Two bunches".into()),
//!     expiration_date: Utc::now() + Duration::hours(12),
//! })?;
//! assert!(listing.is_available(Utc::now()));
//! # Ok::<(), foodbridge_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod claim_code;
pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod registry;
pub mod retry;
pub mod validation;

pub use error::{Error, ErrorCode, FailureKind, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, FailureKind, Result, ResultExt};
    pub use crate::memory::InMemoryRegistry;
    pub use crate::model::{
        ClaimReceipt, Listing, ListingId, ListingState, NewListing, NewStore, Store, StoreId,
    };
    pub use crate::registry::ListingRegistry;
    pub use crate::retry::RetryConfig;
    pub use crate::validation::{ValidationResult, Validator};
}
