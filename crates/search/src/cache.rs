//! Client-side cache of the last completed search.
//!
//! The cache only mirrors what the registry returned. It is never consulted
//! to decide whether a claim may proceed; the registry is the authority.

use foodbridge_core::model::ListingId;
use foodbridge_geo::DistanceUnit;

use crate::grouping::{group_by_store, SearchResults};
use crate::ranker::SearchResult;

/// Ranked results of the most recent search
#[derive(Debug, Clone, Default)]
pub struct ListingCache {
    results: Vec<SearchResult>,
    unit: DistanceUnit,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in the results of a newer search
    pub fn replace(&mut self, results: Vec<SearchResult>, unit: DistanceUnit) {
        self.results = results;
        self.unit = unit;
    }

    /// Drop a listing, returning it if it was cached
    pub fn remove(&mut self, id: ListingId) -> Option<SearchResult> {
        let index = self.results.iter().position(|r| r.listing.id == id)?;
        Some(self.results.remove(index))
    }

    pub fn get(&self, id: ListingId) -> Option<&SearchResult> {
        self.results.iter().find(|r| r.listing.id == id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Cached results in ranked order
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Cached results grouped by store
    pub fn grouped(&self) -> SearchResults {
        SearchResults::new(group_by_store(self.results.clone()), self.unit)
    }
}
