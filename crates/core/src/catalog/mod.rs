//! # Catalog
//!
//! The state-management core: predicates, paging and the store that
//! composes them.
//!
//! ## Modules
//!
//! - `filter` - Keyword and pricing predicates
//! - `paginate` - Fixed-size page windows
//! - `store` - CatalogStore state machine and snapshots
//! - `events` - Events broadcast on every store mutation

pub mod events;
pub mod filter;
pub mod paginate;
pub mod store;

pub use events::{CatalogEvent, CatalogEventKind};
pub use paginate::DEFAULT_PAGE_SIZE;
pub use store::{CatalogPhase, CatalogSnapshot, CatalogStore, FetchTicket};
