//! # Storefront Core
//!
//! The "Brain" of Storefront - a filterable, incrementally loaded catalog.
//!
//! ## Architecture
//!
//! - `models` - Items, pricing tiers and filter criteria
//! - `catalog/` - Filter engine, paginator and the CatalogStore state machine
//! - `sync/` - Query-string codec and the location sync adapter
//! - `loader` - CatalogLoader trait with HTTP, file and in-memory sources
//! - `config` - Defaults and `STOREFRONT_*` environment overrides
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_core::{CatalogConfig, CatalogStore, MemoryLocation, QuerySyncAdapter};
//!
//! let config = CatalogConfig::from_env()?;
//! let mut store = CatalogStore::new(&config);
//! let mut sync = QuerySyncAdapter::new(MemoryLocation::new("keyword=dress"));
//! sync.hydrate(&mut store);
//!
//! let loader = storefront_core::loader::loader_for_source(&config)?;
//! store.fetch_with(loader.as_ref()).await;
//! store.load_more();
//! sync.pump();
//! ```

pub mod catalog;
pub mod config;
pub mod loader;
pub mod models;
pub mod sync;

pub use catalog::{CatalogEvent, CatalogEventKind, CatalogPhase, CatalogSnapshot, CatalogStore};
pub use config::{CatalogConfig, ConfigError};
pub use loader::{CatalogLoader, FetchError};
pub use models::{FilterCriteria, Item, PricingOption};
pub use sync::{Location, MemoryLocation, QuerySyncAdapter, SharedLocation};
