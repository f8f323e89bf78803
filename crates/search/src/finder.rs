//! Caller-side search sessions and the claim handshake.
//!
//! [`FoodFinder`] fetches snapshots from a [`ListingRegistry`], ranks them
//! locally and keeps the last completed search in a [`ListingCache`]. A
//! search that finishes after a newer one was started is discarded. Claims
//! always go to the registry and are never retried here.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use foodbridge_core::config::ConfigSchema;
use foodbridge_core::memory::Clock;
use foodbridge_core::model::{ClaimReceipt, ListingId, MAX_NAME_LEN};
use foodbridge_core::registry::ListingRegistry;
use foodbridge_core::validation::normalize_claimer_name;
use foodbridge_core::{Error, FailureKind, Result};
use foodbridge_geo::{Coordinate, DistanceUnit};
use tracing::{debug, info, instrument, warn, Span};

use crate::cache::ListingCache;
use crate::grouping::{group_by_store, SearchResults};
use crate::radius::SearchRadius;
use crate::ranker::{rank, SearchQuery, SearchResult};

/// Knobs for a [`FoodFinder`]
#[derive(Debug, Clone)]
pub struct FinderSettings {
    /// Radius used when a search does not give one
    pub default_radius: SearchRadius,
    pub unit: DistanceUnit,
    /// Zero keeps the claimer name optional
    pub min_name_length: usize,
    pub max_name_length: usize,
    /// Upper bound on each registry call
    pub timeout: Duration,
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self {
            default_radius: SearchRadius::default(),
            unit: DistanceUnit::default(),
            min_name_length: 0,
            max_name_length: MAX_NAME_LEN,
            timeout: Duration::from_secs(30),
        }
    }
}

impl FinderSettings {
    /// Build settings from a loaded configuration
    ///
    /// # Errors
    /// Returns a validation error if the configured default radius is not a
    /// number.
    pub fn from_config(schema: &ConfigSchema) -> Result<Self> {
        Ok(Self {
            default_radius: SearchRadius::new(schema.search.default_radius)?,
            unit: schema.search.unit,
            min_name_length: schema.claim.min_name_length,
            max_name_length: schema.claim.max_name_length,
            timeout: Duration::from_secs(schema.api.timeout_secs),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// How a search session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Results of the newest search, now also in the cache
    Completed(SearchResults),
    /// A newer search started before this one finished
    Superseded,
}

impl SearchOutcome {
    /// The results, unless the search was superseded
    pub fn completed(self) -> Option<SearchResults> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Superseded => None,
        }
    }
}

/// Search and claim front end over a listing registry
pub struct FoodFinder<R> {
    registry: R,
    settings: FinderSettings,
    cache: Mutex<ListingCache>,
    generation: AtomicU64,
    clock: Clock,
}

impl<R> std::fmt::Debug for FoodFinder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodFinder")
            .field("settings", &self.settings)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<R: ListingRegistry> FoodFinder<R> {
    pub fn new(registry: R, settings: FinderSettings) -> Self {
        Self {
            registry,
            settings,
            cache: Mutex::new(ListingCache::new()),
            generation: AtomicU64::new(0),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used for availability checks
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn settings(&self) -> &FinderSettings {
        &self.settings
    }

    /// Start a search session.
    ///
    /// Uses the configured default radius when `radius` is `None`. Fetch
    /// failures are returned as-is unless the search was superseded, in
    /// which case the outcome is [`SearchOutcome::Superseded`] regardless.
    ///
    /// # Errors
    /// Validation errors for a bad origin; transport errors (including the
    /// caller-side timeout) from the registry.
    #[instrument(skip(self), fields(generation = tracing::field::Empty))]
    pub async fn search(
        &self,
        origin: Coordinate,
        radius: Option<SearchRadius>,
    ) -> Result<SearchOutcome> {
        let query = SearchQuery::new(
            origin,
            radius.unwrap_or(self.settings.default_radius),
            self.settings.unit,
        )?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Span::current().record("generation", generation);

        let fetched = self
            .bounded(self.registry.fetch_available_listings(query.origin()))
            .await;

        if self.is_stale(generation) {
            debug!("Discarding superseded search");
            return Ok(SearchOutcome::Superseded);
        }
        let listings = fetched?;

        let ranked = rank(listings, &query, (self.clock)());
        let results = SearchResults::new(group_by_store(ranked.clone()), query.unit());

        {
            let mut cache = self.cache();
            // Re-check under the lock so an older search can never overwrite
            // a newer one's results
            if self.is_stale(generation) {
                debug!("Discarding superseded search");
                return Ok(SearchOutcome::Superseded);
            }
            cache.replace(ranked, query.unit());
        }

        info!(results = results.len(), stores = results.groups().len(), "Search completed");
        Ok(SearchOutcome::Completed(results))
    }

    /// Claim a listing on behalf of `claimer_name`.
    ///
    /// The listing leaves the cache on success and whenever the registry
    /// reports it missing or taken. A transport failure leaves the cache
    /// untouched since the claim may have gone through.
    ///
    /// # Errors
    /// Validation errors for an over-long name; not-found, conflict and
    /// transport errors from the registry.
    #[instrument(skip(self, claimer_name), fields(listing_id = %id))]
    pub async fn claim(&self, id: ListingId, claimer_name: Option<&str>) -> Result<ClaimReceipt> {
        let name = normalize_claimer_name(
            claimer_name,
            self.settings.min_name_length,
            self.settings.max_name_length,
        )?;

        match self.bounded(self.registry.claim_listing(id, name.as_deref())).await {
            Ok(receipt) => {
                self.cache().remove(id);
                info!("Claim succeeded");
                Ok(receipt)
            }
            Err(err) => match err.kind() {
                FailureKind::NotFound | FailureKind::Conflict => {
                    self.cache().remove(id);
                    warn!(code = %err.code, "Claim rejected");
                    Err(err)
                }
                FailureKind::Transport => {
                    warn!(error = %err, "Claim outcome unknown");
                    Err(err.with_suggestion(
                        "The claim may already have gone through. Search again before retrying.",
                    ))
                }
                FailureKind::Validation | FailureKind::Internal => Err(err),
            },
        }
    }

    /// Results of the last completed search, grouped by store
    pub fn cached_results(&self) -> SearchResults {
        self.cache().grouped()
    }

    /// Look up a listing from the last completed search
    pub fn cached(&self, id: ListingId) -> Option<SearchResult> {
        self.cache().get(id).cloned()
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn cache(&self) -> MutexGuard<'_, ListingCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn bounded<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.settings.timeout;
        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| Error::timeout(timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use foodbridge_core::memory::InMemoryRegistry;
    use foodbridge_core::model::{Listing, NewListing, NewStore};
    use foodbridge_core::ErrorCode;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    const SF: Coordinate = Coordinate { latitude: 37.7749, longitude: -122.4194 };

    fn seeded() -> (InMemoryRegistry, ListingId) {
        let registry = InMemoryRegistry::new();
        let store = registry
            .register_store(NewStore {
                name: "Market St Pantry".to_string(),
                latitude: 37.7833,
                longitude: -122.4167,
            })
            .unwrap();
        let listing = registry
            .add_listing(
                store.id,
                NewListing {
                    name: "Muffins".to_string(),
                    description: None,
                    expiration_date: Utc::now() + ChronoDuration::hours(24),
                },
            )
            .unwrap();
        (registry, listing.id)
    }

    /// First fetch blocks until released; later fetches pass straight through
    struct GatedRegistry {
        inner: InMemoryRegistry,
        gate: Notify,
        calls: AtomicUsize,
    }

    impl ListingRegistry for GatedRegistry {
        async fn fetch_available_listings(&self, origin: Coordinate) -> Result<Vec<Listing>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
            }
            self.inner.fetch_available_listings(origin).await
        }

        async fn claim_listing(
            &self,
            id: ListingId,
            claimer_name: Option<&str>,
        ) -> Result<ClaimReceipt> {
            self.inner.claim_listing(id, claimer_name).await
        }
    }

    /// Never answers
    struct SilentRegistry;

    impl ListingRegistry for SilentRegistry {
        async fn fetch_available_listings(&self, _origin: Coordinate) -> Result<Vec<Listing>> {
            std::future::pending().await
        }

        async fn claim_listing(
            &self,
            _id: ListingId,
            _claimer_name: Option<&str>,
        ) -> Result<ClaimReceipt> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_search_fills_cache() {
        let (registry, id) = seeded();
        let finder = FoodFinder::new(registry, FinderSettings::default());

        let results = finder.search(SF, None).await.unwrap().completed().unwrap();
        assert_eq!(results.groups().len(), 1);
        assert_eq!(results.len(), 1);
        assert!(finder.cached(id).is_some());
        assert_eq!(finder.cached_results(), results);
    }

    #[tokio::test]
    async fn test_claim_removes_from_cache() {
        let (registry, id) = seeded();
        let finder = FoodFinder::new(registry, FinderSettings::default());
        finder.search(SF, None).await.unwrap();

        let receipt = finder.claim(id, Some("  Sam  ")).await.unwrap();
        assert_eq!(receipt.listing_id, id);
        assert!(!receipt.pickup_code.is_empty());
        assert!(receipt.pickup_code.len() <= 10);
        assert!(finder.cached(id).is_none());

        let record = finder.registry().claim_record(id).unwrap();
        assert_eq!(record.claimer_name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn test_second_claim_conflicts() {
        let (registry, id) = seeded();
        let finder = FoodFinder::new(registry, FinderSettings::default());

        let receipt = finder.claim(id, Some("Sam")).await.unwrap();
        let err = finder.claim(id, Some("Alex")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Conflict);
        assert_eq!(
            finder.registry().listing(id).unwrap().claim_code,
            Some(receipt.pickup_code)
        );
    }

    #[tokio::test]
    async fn test_conflict_purges_cache() {
        let (registry, id) = seeded();
        let finder = FoodFinder::new(registry, FinderSettings::default());
        finder.search(SF, None).await.unwrap();

        // Someone else wins the race through the registry directly
        finder.registry().claim(id, Some("Other")).unwrap();
        assert!(finder.cached(id).is_some());

        let err = finder.claim(id, None).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Conflict);
        assert_eq!(err.user_message(), "This item is no longer available");
        assert!(finder.cached(id).is_none());
    }

    #[tokio::test]
    async fn test_unknown_listing_not_found() {
        let (registry, _) = seeded();
        let finder = FoodFinder::new(registry, FinderSettings::default());

        let err = finder.claim(ListingId::new(), Some("Sam")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[tokio::test]
    async fn test_long_name_rejected_before_registry() {
        let (registry, id) = seeded();
        let finder = FoodFinder::new(registry, FinderSettings::default());

        let name = "x".repeat(101);
        let err = finder.claim(id, Some(name.as_str())).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(!finder.registry().listing(id).unwrap().claimed);
    }

    #[tokio::test]
    async fn test_newer_search_supersedes_older() {
        let (inner, id) = seeded();
        let registry = GatedRegistry {
            inner,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        };
        let finder = FoodFinder::new(registry, FinderSettings::default());

        let (first, second) = tokio::join!(finder.search(SF, None), async {
            tokio::task::yield_now().await;
            let outcome = finder.search(SF, None).await;
            finder.registry().gate.notify_one();
            outcome
        });

        assert_eq!(first.unwrap(), SearchOutcome::Superseded);
        assert!(matches!(second.unwrap(), SearchOutcome::Completed(_)));
        assert!(finder.cached(id).is_some());
    }

    #[tokio::test]
    async fn test_search_timeout_is_transport_failure() {
        let settings = FinderSettings::default().with_timeout(Duration::from_millis(20));
        let finder = FoodFinder::new(SilentRegistry, settings);

        let err = finder.search(SF, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_claim_timeout_warns_outcome_unknown() {
        let settings = FinderSettings::default().with_timeout(Duration::from_millis(20));
        let finder = FoodFinder::new(SilentRegistry, settings);

        let err = finder.claim(ListingId::new(), Some("Sam")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.suggestion.is_some());
    }

    #[tokio::test]
    async fn test_invalid_origin_never_reaches_registry() {
        let finder = FoodFinder::new(SilentRegistry, FinderSettings::default());
        let err = finder
            .search(Coordinate::new(120.0, 0.0), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
    }

    #[test]
    fn test_settings_from_config() {
        let mut schema = ConfigSchema::default();
        schema.search.default_radius = 25.0;
        schema.search.unit = DistanceUnit::Kilometers;
        schema.claim.min_name_length = 2;
        schema.api.timeout_secs = 5;

        let settings = FinderSettings::from_config(&schema).unwrap();
        assert_eq!(settings.default_radius.value(), 25.0);
        assert_eq!(settings.unit, DistanceUnit::Kilometers);
        assert_eq!(settings.min_name_length, 2);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }
}
