//! Configuration loading and schema definitions
//!
//! Settings live in a TOML file with `[search]`, `[claim]` and `[api]`
//! sections. Every key is optional.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
