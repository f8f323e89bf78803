//! Endpoint-specific API implementations
//!
//! | Module | Registry route | Description |
//! |--------|----------------|-------------|
//! | `recipient` | `/api/Recipient/*` | Nearby listings and the claim handshake |

pub mod recipient;

pub use recipient::RecipientApi;
