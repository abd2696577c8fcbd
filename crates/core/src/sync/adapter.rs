//! # Query Sync Adapter
//!
//! Keeps the store's criteria mirrored in a navigable location.
//!
//! The location is read exactly once (`hydrate`), before the adapter
//! starts watching the store's criteria. After that the flow is
//! one-directional: every criteria change is written back to the location
//! and the location is never parsed again. Changes made between two
//! writes collapse into the latest criteria.

use super::query::{parse_query, to_query};
use crate::catalog::store::CatalogStore;
use crate::models::FilterCriteria;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Holder of the current query string
pub trait Location {
    /// Current query string (without the leading `?`)
    fn search(&self) -> String;

    /// Replace the query string in place
    fn replace_search(&mut self, search: &str);
}

/// Plain in-memory location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLocation {
    search: String,
    writes: usize,
}

impl MemoryLocation {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            writes: 0,
        }
    }

    /// Number of `replace_search` calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        self.search.clone()
    }

    fn replace_search(&mut self, search: &str) {
        self.search = search.to_string();
        self.writes += 1;
    }
}

/// Location shared between the sync task and request handlers
#[derive(Debug, Clone, Default)]
pub struct SharedLocation {
    inner: Arc<RwLock<String>>,
}

impl SharedLocation {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(search.into())),
        }
    }
}

impl Location for SharedLocation {
    fn search(&self) -> String {
        // A poisoned lock still holds a valid string
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_search(&mut self, search: &str) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = search.to_string();
    }
}

/// Bidirectional sync between a location and a store
pub struct QuerySyncAdapter<L: Location> {
    location: L,
    hydrated: bool,
    criteria: Option<watch::Receiver<FilterCriteria>>,
}

impl<L: Location> QuerySyncAdapter<L> {
    pub fn new(location: L) -> Self {
        Self {
            location,
            hydrated: false,
            criteria: None,
        }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Read criteria from the location into the store, then start watching.
    ///
    /// Runs once; later calls return `None` and touch nothing.
    pub fn hydrate(&mut self, store: &mut CatalogStore) -> Option<FilterCriteria> {
        if self.hydrated {
            return None;
        }
        self.hydrated = true;

        let criteria = parse_query(&self.location.search());
        tracing::debug!(
            keyword = %criteria.keyword,
            pricing = criteria.pricing.len(),
            "Hydrating criteria from location"
        );
        if !criteria.is_unconstrained() {
            store.apply_criteria(criteria.clone());
        }
        self.criteria = Some(store.watch_criteria());
        Some(criteria)
    }

    /// Write out the latest criteria if they changed since the last write.
    /// Returns the number of writes (0 or 1).
    pub fn pump(&mut self) -> usize {
        let Some(rx) = self.criteria.as_mut() else {
            return 0;
        };
        match rx.has_changed() {
            Ok(true) => {
                let criteria = rx.borrow_and_update().clone();
                self.write(&criteria);
                1
            }
            Ok(false) => 0,
            Err(_) => {
                // Store dropped; nothing can change any more
                self.criteria = None;
                0
            }
        }
    }

    /// Mirror criteria changes until the store is dropped
    pub async fn run(mut self) {
        let Some(mut rx) = self.criteria.take() else {
            tracing::warn!("Query sync started before hydrate; nothing to observe");
            return;
        };
        while rx.changed().await.is_ok() {
            let criteria = rx.borrow_and_update().clone();
            self.write(&criteria);
        }
    }

    fn write(&mut self, criteria: &FilterCriteria) {
        let search = to_query(criteria);
        tracing::debug!(search = %search, "Writing criteria to location");
        self.location.replace_search(&search);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, PricingOption};

    fn store_with(items: Vec<Item>) -> CatalogStore {
        let mut store = CatalogStore::with_page_size(20);
        let ticket = store.request_fetch().unwrap();
        store.complete_fetch(ticket, Ok(items));
        store
    }

    #[test]
    fn test_hydrate_applies_location() {
        let mut store = store_with(vec![
            Item::new("1", "Red Dress", PricingOption::Paid),
            Item::new("2", "Blue Dress", PricingOption::ViewOnly),
            Item::new("3", "Green Shirt", PricingOption::Paid),
        ]);
        let mut sync = QuerySyncAdapter::new(MemoryLocation::new("keyword=dress&pricing=Paid"));

        let parsed = sync.hydrate(&mut store).unwrap();
        assert_eq!(parsed.keyword, "dress");
        assert_eq!(store.criteria(), &parsed);
        assert_eq!(store.all_items().len(), 3);
        assert_eq!(store.visible_items().len(), 1);

        // Hydration itself writes nothing back
        assert_eq!(sync.pump(), 0);
        assert_eq!(sync.location().writes(), 0);
    }

    #[test]
    fn test_hydrate_runs_once() {
        let mut store = CatalogStore::with_page_size(20);
        let mut sync = QuerySyncAdapter::new(MemoryLocation::new("keyword=hat"));
        assert!(sync.hydrate(&mut store).is_some());

        store.set_keyword("coat");
        assert!(sync.hydrate(&mut store).is_none());
        assert_eq!(store.criteria().keyword, "coat");
    }

    #[test]
    fn test_outbound_writes_on_every_change() {
        let mut store = CatalogStore::with_page_size(20);
        let mut sync = QuerySyncAdapter::new(MemoryLocation::default());
        sync.hydrate(&mut store);

        store.set_keyword("linen shirt");
        assert_eq!(sync.pump(), 1);
        assert_eq!(sync.location().search(), "keyword=linen%20shirt");

        store.set_pricing_filters([PricingOption::ViewOnly, PricingOption::Free]);
        assert_eq!(sync.pump(), 1);
        assert_eq!(
            sync.location().search(),
            "keyword=linen%20shirt&pricing=Free,ViewOnly"
        );

        store.reset_filters();
        sync.pump();
        assert_eq!(sync.location().search(), "");
        assert_eq!(sync.location().writes(), 3);

        // Nothing new to write
        assert_eq!(sync.pump(), 0);
    }

    #[test]
    fn test_outbound_collapses_to_latest_criteria() {
        let mut store = CatalogStore::with_page_size(20);
        let mut sync = QuerySyncAdapter::new(MemoryLocation::default());
        sync.hydrate(&mut store);

        store.set_keyword("coat");
        store.toggle_pricing(PricingOption::Paid, true);
        store.set_keyword("wool coat");
        assert_eq!(sync.pump(), 1);
        assert_eq!(sync.location().search(), "keyword=wool%20coat&pricing=Paid");
        assert_eq!(sync.location().writes(), 1);
    }

    #[test]
    fn test_outbound_survives_event_burst() {
        let items: Vec<Item> = (0..2000)
            .map(|i| Item::new(i.to_string(), format!("Shirt {}", i), PricingOption::Free))
            .collect();
        let mut store = CatalogStore::with_page_size(1);
        let mut sync = QuerySyncAdapter::new(MemoryLocation::default());
        sync.hydrate(&mut store);
        let ticket = store.request_fetch().unwrap();
        store.complete_fetch(ticket, Ok(items));
        assert_eq!(sync.pump(), 0);

        // Far more store events than the event bus buffers
        store.set_keyword("shirt");
        for _ in 0..70 {
            assert_eq!(store.load_more(), 1);
        }

        assert_eq!(sync.pump(), 1);
        assert_eq!(sync.location().search(), "keyword=shirt");
        assert_eq!(store.criteria().keyword, "shirt");
    }

    #[test]
    fn test_outbound_ignores_non_criteria_events() {
        let mut store = CatalogStore::with_page_size(1);
        let mut sync = QuerySyncAdapter::new(MemoryLocation::new("pricing=Free"));
        sync.hydrate(&mut store);

        let ticket = store.request_fetch().unwrap();
        store.complete_fetch(
            ticket,
            Ok(vec![
                Item::new("1", "A", PricingOption::Free),
                Item::new("2", "B", PricingOption::Free),
            ]),
        );
        store.load_more();
        assert_eq!(sync.pump(), 0);
        assert_eq!(sync.location().search(), "pricing=Free");
    }

    #[test]
    fn test_pump_before_hydrate_is_inert() {
        let mut sync = QuerySyncAdapter::new(MemoryLocation::new("keyword=x"));
        assert_eq!(sync.pump(), 0);
        assert!(!sync.is_hydrated());
    }

    #[tokio::test]
    async fn test_run_mirrors_into_shared_location() {
        let location = SharedLocation::new("keyword=boot");
        let mut store = CatalogStore::with_page_size(20);
        let mut sync = QuerySyncAdapter::new(location.clone());
        sync.hydrate(&mut store);
        assert_eq!(store.criteria().keyword, "boot");

        let task = tokio::spawn(sync.run());
        store.set_pricing_filters([PricingOption::Paid]);
        drop(store);
        task.await.unwrap();

        assert_eq!(location.search(), "keyword=boot&pricing=Paid");
    }
}
