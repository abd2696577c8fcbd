//! # Query Sync
//!
//! Shareable query-string form of the filter criteria.

pub mod adapter;
pub mod query;

pub use adapter::{Location, MemoryLocation, QuerySyncAdapter, SharedLocation};
pub use query::{parse_query, to_query};
