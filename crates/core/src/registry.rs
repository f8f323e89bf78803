//! The listing registry boundary
//!
//! The registry owns durable listing state. Search only ever reads a
//! snapshot from it; the claim check-and-set happens inside the registry so
//! that concurrent claimers see exactly one winner.

use std::future::Future;
use std::sync::Arc;

use foodbridge_geo::Coordinate;

use crate::error::Result;
use crate::model::{ClaimReceipt, Listing, ListingId};

/// Remote or local authority over stores and listings
pub trait ListingRegistry: Send + Sync {
    /// Snapshot of listings visible from `origin`.
    ///
    /// Callers must not assume the snapshot is filtered by claim state,
    /// expiry or distance.
    fn fetch_available_listings(
        &self,
        origin: Coordinate,
    ) -> impl Future<Output = Result<Vec<Listing>>> + Send;

    /// Atomically claim a listing.
    ///
    /// Fails with a not-found error for unknown ids and a conflict error when
    /// the listing is already claimed or expired. Not idempotent: callers
    /// must not retry after an ambiguous failure.
    fn claim_listing(
        &self,
        id: ListingId,
        claimer_name: Option<&str>,
    ) -> impl Future<Output = Result<ClaimReceipt>> + Send;
}

impl<T: ListingRegistry> ListingRegistry for Arc<T> {
    fn fetch_available_listings(
        &self,
        origin: Coordinate,
    ) -> impl Future<Output = Result<Vec<Listing>>> + Send {
        (**self).fetch_available_listings(origin)
    }

    fn claim_listing(
        &self,
        id: ListingId,
        claimer_name: Option<&str>,
    ) -> impl Future<Output = Result<ClaimReceipt>> + Send {
        (**self).claim_listing(id, claimer_name)
    }
}
