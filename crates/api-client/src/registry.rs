//! [`ListingRegistry`] backed by the REST registry

use crate::client::FoodbridgeClient;
use foodbridge_core::model::{ClaimReceipt, Listing, ListingId};
use foodbridge_core::registry::ListingRegistry;
use foodbridge_core::{Error, Result};
use foodbridge_geo::Coordinate;
use tracing::instrument;

/// Remote registry reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: FoodbridgeClient,
}

impl HttpRegistry {
    /// Wrap a configured client
    #[must_use]
    pub fn new(client: FoodbridgeClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &FoodbridgeClient {
        &self.client
    }
}

impl ListingRegistry for HttpRegistry {
    #[instrument(skip(self))]
    async fn fetch_available_listings(&self, origin: Coordinate) -> Result<Vec<Listing>> {
        self.client
            .recipient()
            .available_food(origin)
            .await
            .map_err(|e| Error::from(e).with_context("fetching available listings"))
    }

    #[instrument(skip(self, claimer_name), fields(listing_id = %id))]
    async fn claim_listing(&self, id: ListingId, claimer_name: Option<&str>) -> Result<ClaimReceipt> {
        self.client
            .recipient()
            .claim(id, claimer_name)
            .await
            .map_err(|e| Error::from(e).with_context(format!("claiming listing {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::Session;
    use foodbridge_core::{ErrorCode, FailureKind};
    use foodbridge_core::retry::RetryConfig;
    use std::time::Duration;

    fn unreachable_registry() -> HttpRegistry {
        // Port 9 (discard) on loopback refuses connections
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .with_retry(RetryConfig::no_retry());
        HttpRegistry::new(FoodbridgeClient::with_config(config, Session::anonymous()).unwrap())
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_transport_failure() {
        let registry = unreachable_registry();
        let err = registry
            .fetch_available_listings(Coordinate::new(37.7749, -122.4194))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.context.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_claim_is_transport_failure() {
        let registry = unreachable_registry();
        let err = registry
            .claim_listing(ListingId::new(), Some("Sam"))
            .await
            .unwrap_err();
        assert!(matches!(err.code, ErrorCode::TransportError | ErrorCode::Timeout));
    }
}
