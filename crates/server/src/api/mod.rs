//! # API Routes
//!
//! - `catalog` - Snapshot, commands and event stream for the catalog store

pub mod catalog;
