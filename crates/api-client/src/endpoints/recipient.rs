//! Recipient API endpoints
//!
//! - `GET /api/Recipient/available-food?latitude=..&longitude=..`
//! - `POST /api/Recipient/claim/{id}`
//!
//! Wire types stay private to this module; callers only ever see the core
//! [`Listing`] and [`ClaimReceipt`].

use crate::client::FoodbridgeClient;
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use foodbridge_core::model::{
    ClaimReceipt, Listing, ListingId, Store, StoreId, MAX_CLAIM_CODE_LEN,
};
use foodbridge_geo::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::warn;

const AVAILABLE_FOOD_PATH: &str = "api/Recipient/available-food";

/// Recipient API interface
#[derive(Clone)]
pub struct RecipientApi {
    client: FoodbridgeClient,
}

impl RecipientApi {
    /// Create a new recipient API interface
    pub(crate) fn new(client: FoodbridgeClient) -> Self {
        Self { client }
    }

    /// Listings the registry considers available near `origin`
    ///
    /// GET /api/Recipient/available-food
    ///
    /// # Errors
    /// Transport and response errors from the client.
    pub async fn available_food(&self, origin: Coordinate) -> ApiResult<Vec<Listing>> {
        let query = [
            ("latitude", origin.latitude.to_string()),
            ("longitude", origin.longitude.to_string()),
        ];
        let envelope: FoodItemsEnvelope = self.client.get(AVAILABLE_FOOD_PATH, &query).await?;
        Ok(into_listings(envelope, Utc::now()))
    }

    /// Claim a listing
    ///
    /// POST /api/Recipient/claim/{id}
    ///
    /// # Errors
    /// Status errors for rejected claims; a malformed-response error when the
    /// reply carries no usable pickup code.
    pub async fn claim(&self, id: ListingId, claimer_name: Option<&str>) -> ApiResult<ClaimReceipt> {
        let body = ClaimFoodRequest {
            claimer_name: claimer_name.unwrap_or_default(),
        };
        let response: ClaimFoodResponse = self
            .client
            .post(&format!("api/Recipient/claim/{id}"), &body)
            .await?;
        response.into_receipt(id)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimFoodRequest<'a> {
    claimer_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimFoodResponse {
    #[serde(default)]
    claim_code: Option<String>,
}

impl ClaimFoodResponse {
    fn into_receipt(self, listing_id: ListingId) -> ApiResult<ClaimReceipt> {
        match self.claim_code.map(|c| c.trim().to_string()) {
            Some(code) if !code.is_empty() && code.chars().count() <= MAX_CLAIM_CODE_LEN => {
                Ok(ClaimReceipt {
                    listing_id,
                    pickup_code: code,
                })
            }
            Some(code) if !code.is_empty() => Err(ApiError::MalformedResponse(format!(
                "claim code longer than {MAX_CLAIM_CODE_LEN} characters"
            ))),
            _ => Err(ApiError::MalformedResponse(
                "claim response carried no claim code".to_string(),
            )),
        }
    }
}

/// The registry answers with a bare array or one of two wrappers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FoodItemsEnvelope {
    Bare(Vec<FoodItemDto>),
    Values {
        #[serde(rename = "$values")]
        values: Vec<FoodItemDto>,
    },
    Data {
        data: Vec<FoodItemDto>,
    },
}

impl FoodItemsEnvelope {
    fn into_items(self) -> Vec<FoodItemDto> {
        match self {
            Self::Bare(items) | Self::Values { values: items } | Self::Data { data: items } => {
                items
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodItemDto {
    #[serde(default)]
    id: Option<ListingId>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    expiration_date: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    is_claimed: Option<bool>,
    #[serde(default)]
    claim_code: Option<String>,
    store_id: StoreId,
    #[serde(default)]
    store: Option<StoreDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDto {
    #[serde(default)]
    id: Option<StoreId>,
    name: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl StoreDto {
    fn into_store(self, fallback_id: StoreId) -> Store {
        // Missing or out-of-range coordinates leave the distance undefined
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng).ok(),
            _ => None,
        };
        Store {
            id: self.id.unwrap_or(fallback_id),
            name: self.name,
            location,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

impl FoodItemDto {
    fn into_listing(self, fetched_at: DateTime<Utc>) -> Option<Listing> {
        let Some(id) = self.id else {
            warn!(name = %self.name, "Skipping listing without an id");
            return None;
        };
        let Some(expiration_date) = parse_timestamp(&self.expiration_date) else {
            warn!(listing_id = %id, "Skipping listing with unreadable expiration date");
            return None;
        };
        let store_id = self.store_id;
        Some(Listing {
            id,
            name: self.name,
            description: self.description,
            expiration_date,
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(fetched_at),
            claimed: self.is_claimed.unwrap_or(false),
            claim_code: self.claim_code,
            picked_up: false,
            store_id,
            store: self.store.map(|s| s.into_store(store_id)),
        })
    }
}

fn into_listings(envelope: FoodItemsEnvelope, fetched_at: DateTime<Utc>) -> Vec<Listing> {
    envelope
        .into_items()
        .into_iter()
        .filter_map(|item| item.into_listing(fetched_at))
        .collect()
}

/// RFC 3339, or a bare local timestamp which the registry writes in UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
