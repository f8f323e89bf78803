//! Availability and radius filtering with stable distance ranking.

use chrono::{DateTime, Utc};
use foodbridge_core::model::Listing;
use foodbridge_core::Result;
use foodbridge_geo::{distances_from, Coordinate, DistanceUnit};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grouping::{group_by_store, SearchResults};
use crate::radius::SearchRadius;

/// Where to search from and how far out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    origin: Coordinate,
    radius: SearchRadius,
    unit: DistanceUnit,
}

impl SearchQuery {
    /// Build a query, validating the origin.
    ///
    /// # Errors
    /// Returns a validation error when the origin is not a finite, in-range
    /// coordinate.
    pub fn new(origin: Coordinate, radius: SearchRadius, unit: DistanceUnit) -> Result<Self> {
        let origin = Coordinate::try_new(origin.latitude, origin.longitude)?;
        Ok(Self { origin, radius, unit })
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn radius(&self) -> SearchRadius {
        self.radius
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }
}

/// A listing annotated with its distance from the searcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub listing: Listing,
    /// Distance in the query's unit
    pub distance: f64,
}

/// Filter and rank listings.
///
/// Drops listings that are claimed or expired at `now`, listings whose store
/// has no coordinates, and listings farther than the radius (a listing
/// exactly on the radius is kept). The rest are sorted by ascending distance;
/// equal distances keep their input order.
pub fn rank(listings: Vec<Listing>, query: &SearchQuery, now: DateTime<Utc>) -> Vec<SearchResult> {
    let total = listings.len();
    let available: Vec<Listing> = listings.into_iter().filter(|l| l.is_available(now)).collect();

    let points: Vec<Option<Coordinate>> = available.iter().map(Listing::store_location).collect();
    let distances = distances_from(&query.origin, &points, query.unit);

    let radius = query.radius.value();
    let mut results: Vec<SearchResult> = available
        .into_iter()
        .zip(distances)
        .filter_map(|(listing, distance)| {
            distance
                .filter(|d| *d <= radius)
                .map(|distance| SearchResult { listing, distance })
        })
        .collect();

    // `sort_by` is stable, so ties keep input order
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    debug!(
        candidates = total,
        results = results.len(),
        radius = radius,
        unit = %query.unit,
        "Ranked listings"
    );
    results
}

/// Rank listings and group them by store.
pub fn search(listings: Vec<Listing>, query: &SearchQuery, now: DateTime<Utc>) -> SearchResults {
    SearchResults::new(group_by_store(rank(listings, query, now)), query.unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use foodbridge_core::model::{ListingId, Store, StoreId};
    use proptest::prelude::*;

    const SF: Coordinate = Coordinate { latitude: 37.7749, longitude: -122.4194 };

    fn store_at(name: &str, location: Option<Coordinate>) -> Store {
        Store::new(StoreId::new(), name, location)
    }

    fn listing_at(store: &Store, name: &str, expires_in: Duration, claimed: bool) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(),
            name: name.to_string(),
            description: None,
            expiration_date: now + expires_in,
            created_at: now,
            claimed,
            claim_code: claimed.then(|| "K7P2QX".to_string()),
            picked_up: false,
            store_id: store.id,
            store: Some(store.clone()),
        }
    }

    fn query(radius: f64) -> SearchQuery {
        SearchQuery::new(SF, SearchRadius::new(radius).unwrap(), DistanceUnit::Miles).unwrap()
    }

    #[test]
    fn test_single_nearby_listing() {
        let store = store_at("Market St Pantry", Some(Coordinate::new(37.7833, -122.4167)));
        let listing = listing_at(&store, "Muffins", Duration::hours(24), false);

        let results = search(vec![listing.clone()], &query(10.0), Utc::now());

        assert_eq!(results.groups().len(), 1);
        let group = &results.groups()[0];
        assert_eq!(group.store.id, store.id);
        assert_eq!(group.listings.len(), 1);
        assert_eq!(group.listings[0].listing.id, listing.id);
        assert!(group.listings[0].distance < 10.0);
        assert!(!group.listings[0].listing.claimed);
    }

    #[test]
    fn test_expired_listing_excluded() {
        let store = store_at("Market St Pantry", Some(Coordinate::new(37.7833, -122.4167)));
        let listing = listing_at(&store, "Muffins", Duration::hours(-1), false);

        let results = search(vec![listing], &query(10.0), Utc::now());
        assert!(results.is_empty());
        assert!(results.groups().is_empty());
    }

    #[test]
    fn test_claimed_listing_excluded() {
        let store = store_at("Market St Pantry", Some(Coordinate::new(37.7833, -122.4167)));
        let listing = listing_at(&store, "Muffins", Duration::hours(24), true);

        assert!(rank(vec![listing], &query(10.0), Utc::now()).is_empty());
    }

    #[test]
    fn test_store_without_coordinates_excluded() {
        let store = store_at("Unknown", None);
        let listing = listing_at(&store, "Rice", Duration::hours(24), false);
        let mut orphan = listing_at(&store, "Beans", Duration::hours(24), false);
        orphan.store = None;

        assert!(rank(vec![listing, orphan], &query(50.0), Utc::now()).is_empty());
    }

    #[test]
    fn test_radius_boundary_inclusive() {
        let store = store_at("Oakland Co-op", Some(Coordinate::new(37.8044, -122.2712)));
        let listing = listing_at(&store, "Greens", Duration::hours(24), false);
        let exact = DistanceUnit::Miles.distance(&SF, &Coordinate::new(37.8044, -122.2712));

        let on_boundary = SearchQuery::new(SF, SearchRadius::new(exact).unwrap(), DistanceUnit::Miles).unwrap();
        assert_eq!(rank(vec![listing.clone()], &on_boundary, Utc::now()).len(), 1);

        let inside = SearchQuery::new(SF, SearchRadius::new(exact - 0.01).unwrap(), DistanceUnit::Miles).unwrap();
        assert!(rank(vec![listing], &inside, Utc::now()).is_empty());
    }

    #[test]
    fn test_sorted_with_stable_ties() {
        let near = store_at("Near", Some(Coordinate::new(37.7760, -122.4194)));
        let far = store_at("Far", Some(Coordinate::new(37.8044, -122.2712)));

        let far_a = listing_at(&far, "far-a", Duration::hours(5), false);
        let near_a = listing_at(&near, "near-a", Duration::hours(5), false);
        let near_b = listing_at(&near, "near-b", Duration::hours(5), false);
        let far_b = listing_at(&far, "far-b", Duration::hours(5), false);

        let ranked = rank(vec![far_a, near_a, near_b, far_b], &query(50.0), Utc::now());
        let names: Vec<&str> = ranked.iter().map(|r| r.listing.name.as_str()).collect();
        assert_eq!(names, vec!["near-a", "near-b", "far-a", "far-b"]);
    }

    #[test]
    fn test_kilometers_unit() {
        let store = store_at("Oakland Co-op", Some(Coordinate::new(37.8044, -122.2712)));
        let listing = listing_at(&store, "Greens", Duration::hours(24), false);
        // ~8.3 miles, ~13.4 km
        let km = SearchQuery::new(SF, SearchRadius::new(10.0).unwrap(), DistanceUnit::Kilometers).unwrap();
        assert!(rank(vec![listing.clone()], &km, Utc::now()).is_empty());
        assert_eq!(rank(vec![listing], &query(10.0), Utc::now()).len(), 1);
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let err = SearchQuery::new(
            Coordinate::new(f64::NAN, 0.0),
            SearchRadius::default(),
            DistanceUnit::Miles,
        )
        .unwrap_err();
        assert_eq!(err.kind(), foodbridge_core::FailureKind::Validation);
    }

    proptest! {
        #[test]
        fn prop_results_respect_filters(
            specs in proptest::collection::vec(
                (37.0f64..38.5, -123.0f64..-121.5, -48i64..48, any::<bool>()),
                0..40,
            ),
            radius in 1.0f64..50.0,
        ) {
            let now = Utc::now();
            let listings: Vec<Listing> = specs
                .iter()
                .map(|(lat, lng, hours, claimed)| {
                    let store = store_at("s", Some(Coordinate::new(*lat, *lng)));
                    let mut l = listing_at(&store, "x", Duration::hours(*hours), *claimed);
                    l.expiration_date = now + Duration::hours(*hours);
                    l
                })
                .collect();

            let q = query(radius);
            let ranked = rank(listings, &q, now);

            for r in &ranked {
                prop_assert!(!r.listing.claimed);
                prop_assert!(now < r.listing.expiration_date);
                prop_assert!(r.distance <= q.radius().value());
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
            }
        }
    }
}
