//! Nearby food search and the caller side of the claim handshake.
//!
//! This crate provides:
//! - Radius clamping for free-form input
//! - Availability and distance filtering with stable ranking
//! - Grouping of ranked listings by store
//! - Search sessions that discard superseded responses
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use foodbridge_core::model::{Listing, ListingId, Store, StoreId};
//! use foodbridge_geo::{Coordinate, DistanceUnit};
//! use foodbridge_search::{search, SearchQuery, SearchRadius};
//!
//! let store = Store::new(StoreId::new(), "Market St Pantry", Some(Coordinate::new(37.7833, -122.4167)));
//! let listing = Listing {
//!     id: ListingId::new(),
//!     name: "Muffins".into(),
//!     description: None,
//!     expiration_date: Utc::now() + Duration::hours(24),
//!     created_at: Utc::now(),
//!     claimed: false,
//!     claim_code: None,
//!     picked_up: false,
//!     store_id: store.id,
//!     store: Some(store),
//! };
//!
//! let query = SearchQuery::new(
//!     Coordinate::new(37.7749, -122.4194),
//!     SearchRadius::from_input("10"),
//!     DistanceUnit::Miles,
//! )?;
//! let results = search(vec![listing], &query, Utc::now());
//! assert_eq!(results.groups().len(), 1);
//! # Ok::<(), foodbridge_core::Error>(())
//! ```

pub mod cache;
pub mod finder;
mod grouping;
mod radius;
mod ranker;

pub use cache::ListingCache;
pub use finder::{FinderSettings, FoodFinder, SearchOutcome};
pub use grouping::{group_by_store, SearchResults, StoreGroup};
pub use radius::SearchRadius;
pub use ranker::{rank, search, SearchQuery, SearchResult};
