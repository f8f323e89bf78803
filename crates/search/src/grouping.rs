//! Group ranked listings by their store for display.

use foodbridge_core::model::Store;
use foodbridge_geo::DistanceUnit;
use serde::{Deserialize, Serialize};

use crate::ranker::SearchResult;

/// All results from one store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreGroup {
    pub store: Store,
    /// Distance to the store in the search unit
    pub distance: f64,
    /// Listings in ranked order
    pub listings: Vec<SearchResult>,
}

/// Store groups ordered by ascending distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    groups: Vec<StoreGroup>,
    unit: DistanceUnit,
}

impl SearchResults {
    pub fn new(groups: Vec<StoreGroup>, unit: DistanceUnit) -> Self {
        Self { groups, unit }
    }

    pub fn empty(unit: DistanceUnit) -> Self {
        Self::new(Vec::new(), unit)
    }

    pub fn groups(&self) -> &[StoreGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<StoreGroup> {
        self.groups
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of listings across all groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.listings.len()).sum()
    }

    /// Iterate listings in display order
    pub fn listings(&self) -> impl Iterator<Item = &SearchResult> {
        self.groups.iter().flat_map(|g| g.listings.iter())
    }
}

/// Partition ranked results by store.
///
/// Groups appear in order of each store's first listing, which for ranked
/// input is ascending store distance. Listings whose store was not embedded
/// are skipped since they cannot be shown under a store heading.
pub fn group_by_store(results: Vec<SearchResult>) -> Vec<StoreGroup> {
    let mut groups: Vec<StoreGroup> = Vec::new();

    for result in results {
        let Some(store) = result.listing.store.clone() else {
            continue;
        };
        match groups.iter_mut().find(|g| g.store.id == store.id) {
            Some(group) => group.listings.push(result),
            None => groups.push(StoreGroup {
                store,
                distance: result.distance,
                listings: vec![result],
            }),
        }
    }

    groups.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    groups
}
