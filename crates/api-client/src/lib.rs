//! HTTP client for the FoodBridge listing registry
//!
//! This crate provides [`HttpRegistry`], a
//! [`ListingRegistry`](foodbridge_core::registry::ListingRegistry) that talks
//! to the registry's REST API.
//!
//! # Features
//!
//! - **Environment-based configuration**: URL, timeout and environment from
//!   `FOODBRIDGE_*` variables layered over the config file
//! - **Retry with exponential backoff**: reads only; claims are sent once
//! - **Request correlation**: every request carries an `X-Request-ID`
//! - **Response normalization**: bare arrays and `$values`/`data` wrappers
//!
//! # Example
//!
//! ```rust,no_run
//! use foodbridge_api_client::{ClientConfig, FoodbridgeClient, HttpRegistry, Session};
//! use foodbridge_core::registry::ListingRegistry;
//! use foodbridge_geo::Coordinate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FoodbridgeClient::with_config(ClientConfig::from_env()?, Session::from_env())?;
//!     let registry = HttpRegistry::new(client);
//!
//!     let listings = registry
//!         .fetch_available_listings(Coordinate::new(37.7749, -122.4194))
//!         .await?;
//!     println!("{} listings nearby", listings.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod registry;
pub mod session;

pub use client::FoodbridgeClient;
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ApiResult};
pub use registry::HttpRegistry;
pub use session::Session;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::FoodbridgeClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::RecipientApi;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::registry::HttpRegistry;
    pub use crate::session::Session;
}
