//! Subcommand implementations

pub mod claim;
pub mod search;
