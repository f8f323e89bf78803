//! In-process listing registry
//!
//! Holds stores and listings behind a single mutex. Every claim runs its
//! availability check and its mutation under that one lock, so two racing
//! claims on the same listing can never both succeed.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use foodbridge_core::memory::InMemoryRegistry;
//! use foodbridge_core::model::{NewListing, NewStore};
//!
//! let registry = InMemoryRegistry::new();
//! let store = registry.register_store(NewStore {
//!     name: "Mission Pantry".into(),
//!     latitude: 37.7833,
//!     longitude: -122.4167,
//! })?;
//! let listing = registry.add_listing(store.id, NewListing {
//!     name: "Bagels".into(),
//!     description: None,
//!     expiration_date: Utc::now() + Duration::hours(24),
//! })?;
//!
//! let receipt = registry.claim(listing.id, Some("Sam"))?;
//! assert!(registry.claim(listing.id, Some("Alex")).is_err());
//! assert_eq!(registry.listing(listing.id).unwrap().claim_code, Some(receipt.pickup_code));
//! # Ok::<(), foodbridge_core::Error>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use foodbridge_geo::Coordinate;
use tracing::{debug, info, instrument};

use crate::claim_code::CodeGenerator;
use crate::config::ClaimConfig;
use crate::error::{Error, ErrorCode, Result};
use crate::model::{ClaimReceipt, Listing, ListingId, NewListing, NewStore, Store, StoreId};
use crate::registry::ListingRegistry;
use crate::validation::{validate_new_listing, validate_new_store};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Who claimed a listing and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub claimer_name: Option<String>,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    stores: HashMap<StoreId, Store>,
    listings: HashMap<ListingId, Listing>,
    /// Listing ids in insertion order, so snapshots are deterministic
    order: Vec<ListingId>,
    claims: HashMap<ListingId, ClaimRecord>,
}

impl State {
    fn codes_in_store(&self, store_id: StoreId) -> HashSet<String> {
        self.listings
            .values()
            .filter(|l| l.store_id == store_id)
            .filter_map(|l| l.claim_code.clone())
            .collect()
    }
}

/// Registry that keeps everything in memory
pub struct InMemoryRegistry {
    state: Mutex<State>,
    codes: CodeGenerator,
    clock: Clock,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRegistry")
            .field("codes", &self.codes)
            .finish_non_exhaustive()
    }
}

impl InMemoryRegistry {
    /// Create an empty registry using the system clock
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            codes: CodeGenerator::default(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Create an empty registry using the `[claim]` settings
    pub fn from_config(claim: &ClaimConfig) -> Self {
        Self::new().with_code_generator(CodeGenerator::new(claim.code_length))
    }

    /// Replace the clock (tests pin time with this)
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the pickup code generator
    #[must_use]
    pub fn with_code_generator(mut self, codes: CodeGenerator) -> Self {
        self.codes = codes;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::internal("Failed to acquire registry lock"))
    }

    /// Register a new store
    pub fn register_store(&self, store: NewStore) -> Result<Store> {
        validate_new_store(&store).to_result()?;

        let record = Store {
            id: StoreId::new(),
            name: store.name.trim().to_string(),
            location: Some(Coordinate::new(store.latitude, store.longitude)),
            created_at: Some(self.now()),
        };

        self.lock()?.stores.insert(record.id, record.clone());
        info!(store_id = %record.id, name = %record.name, "Store registered");
        Ok(record)
    }

    /// Insert a store as-is, including one without coordinates
    pub fn insert_store(&self, store: Store) -> Result<()> {
        self.lock()?.stores.insert(store.id, store);
        Ok(())
    }

    /// List a new item under `store_id`
    pub fn add_listing(&self, store_id: StoreId, listing: NewListing) -> Result<Listing> {
        let now = self.now();
        validate_new_listing(&listing, now).to_result()?;

        let mut state = self.lock()?;
        if !state.stores.contains_key(&store_id) {
            return Err(Error::store_not_found(store_id));
        }

        let record = Listing {
            id: ListingId::new(),
            name: listing.name.trim().to_string(),
            description: listing.description.filter(|d| !d.trim().is_empty()),
            expiration_date: listing.expiration_date,
            created_at: now,
            claimed: false,
            claim_code: None,
            picked_up: false,
            store_id,
            store: None,
        };

        state.order.push(record.id);
        state.listings.insert(record.id, record.clone());
        debug!(listing_id = %record.id, store_id = %store_id, "Listing added");
        Ok(record)
    }

    /// Current state of a listing, with its store embedded
    pub fn listing(&self, id: ListingId) -> Option<Listing> {
        let state = self.lock().ok()?;
        state.listings.get(&id).map(|l| with_store(l, &state.stores))
    }

    /// All listings of a store, in insertion order
    pub fn store_listings(&self, store_id: StoreId) -> Result<Vec<Listing>> {
        let state = self.lock()?;
        if !state.stores.contains_key(&store_id) {
            return Err(Error::store_not_found(store_id));
        }
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.listings.get(id))
            .filter(|l| l.store_id == store_id)
            .map(|l| with_store(l, &state.stores))
            .collect())
    }

    /// Who claimed a listing, if anyone
    pub fn claim_record(&self, id: ListingId) -> Option<ClaimRecord> {
        self.lock().ok()?.claims.get(&id).cloned()
    }

    /// Snapshot of unclaimed, unexpired listings with their stores embedded
    pub fn available_listings(&self) -> Result<Vec<Listing>> {
        let now = self.now();
        let state = self.lock()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.listings.get(id))
            .filter(|l| l.is_available(now))
            .map(|l| with_store(l, &state.stores))
            .collect())
    }

    /// Claim a listing: check availability and mark it claimed under one lock.
    #[instrument(skip_all, fields(listing_id = %id))]
    pub fn claim(&self, id: ListingId, claimer_name: Option<&str>) -> Result<ClaimReceipt> {
        let now = self.now();
        let mut state = self.lock()?;

        let (store_id, claimed, expired) = match state.listings.get(&id) {
            Some(l) => (l.store_id, l.claimed, l.is_expired(now)),
            None => return Err(Error::listing_not_found(id)),
        };
        if claimed {
            debug!("Rejected claim on already claimed listing");
            return Err(Error::already_claimed(id));
        }
        if expired {
            debug!("Rejected claim on expired listing");
            return Err(Error::listing_expired(id));
        }

        let taken = state.codes_in_store(store_id);
        let code = self
            .codes
            .generate_unique(|c| taken.contains(c))
            .ok_or_else(|| {
                Error::new(ErrorCode::Internal, "Could not allocate a unique pickup code")
            })?;

        if let Some(listing) = state.listings.get_mut(&id) {
            listing.claimed = true;
            listing.claim_code = Some(code.clone());
        }
        state.claims.insert(
            id,
            ClaimRecord {
                claimer_name: claimer_name.map(str::to_string),
                claimed_at: now,
            },
        );

        info!(store_id = %store_id, "Listing claimed");
        Ok(ClaimReceipt {
            listing_id: id,
            pickup_code: code,
        })
    }

    /// Donor confirms a claimed item was collected
    pub fn mark_picked_up(&self, id: ListingId) -> Result<Listing> {
        let mut state = self.lock()?;
        let listing = state
            .listings
            .get_mut(&id)
            .ok_or_else(|| Error::listing_not_found(id))?;
        if !listing.claimed {
            return Err(Error::not_claimed(id));
        }
        listing.picked_up = true;
        let updated = listing.clone();
        Ok(with_store(&updated, &state.stores))
    }
}

fn with_store(listing: &Listing, stores: &HashMap<StoreId, Store>) -> Listing {
    let mut out = listing.clone();
    out.store = stores.get(&listing.store_id).cloned();
    out
}

impl ListingRegistry for InMemoryRegistry {
    async fn fetch_available_listings(&self, _origin: Coordinate) -> Result<Vec<Listing>> {
        self.available_listings()
    }

    async fn claim_listing(
        &self,
        id: ListingId,
        claimer_name: Option<&str>,
    ) -> Result<ClaimReceipt> {
        self.claim(id, claimer_name)
    }
}
