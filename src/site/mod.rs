//! Remote site layout
//!
//! Builds listing, item and paradigm URLs from the `[site]` configuration.

mod endpoints;

pub use endpoints::{Endpoints, ALL_SUBSETS_KEY};
