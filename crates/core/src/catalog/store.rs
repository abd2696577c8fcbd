//! # Catalog Store
//!
//! State machine owning the fetched items, the filter criteria and the
//! visible window. The window is never stored as a list: it is selected
//! from a cache of filtered positions that is rebuilt whenever the items
//! or the criteria change.

use super::events::{CatalogEvent, CatalogEventKind};
use super::{filter, paginate};
use crate::config::CatalogConfig;
use crate::loader::{CatalogLoader, FetchError};
use crate::models::{FilterCriteria, Item, PricingOption};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tokio::sync::{broadcast, watch};

const EVENT_CAPACITY: usize = 64;

/// Lifecycle of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogPhase {
    /// Nothing fetched yet
    Empty,
    /// A fetch is outstanding
    Loading,
    /// At least one fetch has completed (successfully or not)
    Ready,
}

/// Identifies the outstanding fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Read-only view handed to presentation
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub visible_items: Vec<Item>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub criteria: FilterCriteria,
    pub page_index: usize,
    pub total_items: usize,
    pub filtered_count: usize,
    pub phase: CatalogPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// The catalog state machine
pub struct CatalogStore {
    page_size: usize,
    strict_has_more: bool,
    all_items: Vec<Item>,
    criteria: FilterCriteria,
    page_index: usize,
    /// Positions in `all_items` passing `criteria`
    filtered: Vec<usize>,
    has_more: bool,
    error: Option<String>,
    in_flight: Option<FetchTicket>,
    next_ticket: u64,
    fetched_once: bool,
    last_fetched_at: Option<DateTime<Utc>>,
    event_tx: broadcast::Sender<CatalogEvent>,
    /// Latest criteria; unlike the event bus it cannot lag
    criteria_tx: watch::Sender<FilterCriteria>,
}

impl CatalogStore {
    /// Create an empty store. A page size of 0 is treated as 1.
    pub fn new(config: &CatalogConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (criteria_tx, _) = watch::channel(FilterCriteria::default());
        Self {
            page_size: config.page_size.max(1),
            strict_has_more: config.strict_has_more,
            all_items: Vec::new(),
            criteria: FilterCriteria::default(),
            page_index: 1,
            filtered: Vec::new(),
            has_more: false,
            error: None,
            in_flight: None,
            next_ticket: 1,
            fetched_once: false,
            last_fetched_at: None,
            event_tx,
            criteria_tx,
        }
    }

    /// Create an empty store with default settings and the given page size
    pub fn with_page_size(page_size: usize) -> Self {
        Self::new(&CatalogConfig::with_page_size(page_size))
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.event_tx.subscribe()
    }

    /// Watch the criteria. The current value is marked as seen.
    pub fn watch_criteria(&self) -> watch::Receiver<FilterCriteria> {
        self.criteria_tx.subscribe()
    }

    // ========== Reads ==========

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn all_items(&self) -> &[Item] {
        &self.all_items
    }

    pub fn phase(&self) -> CatalogPhase {
        if self.in_flight.is_some() {
            CatalogPhase::Loading
        } else if self.fetched_once {
            CatalogPhase::Ready
        } else {
            CatalogPhase::Empty
        }
    }

    /// Number of items passing the current criteria
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// First `page_index` pages of the filtered items
    pub fn visible_items(&self) -> Vec<&Item> {
        paginate::window(&self.filtered, self.page_index, self.page_size)
            .iter()
            .map(|&i| &self.all_items[i])
            .collect()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            visible_items: self.visible_items().into_iter().cloned().collect(),
            has_more: self.has_more,
            loading: self.is_loading(),
            error: self.error.clone(),
            criteria: self.criteria.clone(),
            page_index: self.page_index,
            total_items: self.all_items.len(),
            filtered_count: self.filtered.len(),
            phase: self.phase(),
            last_fetched_at: self.last_fetched_at,
        }
    }

    // ========== Fetch lifecycle ==========

    /// Enter Loading and issue a ticket for the caller to complete.
    ///
    /// Existing items stay visible while loading. Returns `None` when a
    /// fetch is already outstanding.
    pub fn request_fetch(&mut self) -> Option<FetchTicket> {
        if let Some(ticket) = self.in_flight {
            tracing::debug!(ticket = ticket.0, "Fetch already in flight");
            return None;
        }
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.emit(CatalogEventKind::FetchStarted { ticket: ticket.0 });
        Some(ticket)
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// Returns false (and changes nothing) if `ticket` is not the
    /// outstanding fetch.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Item>, FetchError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::warn!(ticket = ticket.0, "Ignoring completion of a stale fetch");
            return false;
        }
        self.in_flight = None;
        self.fetched_once = true;

        match result {
            Ok(items) => {
                self.all_items = items;
                self.error = None;
                self.last_fetched_at = Some(Utc::now());
                self.refilter();
                // Upstream behavior: always offer another page after a fetch
                self.has_more = if self.strict_has_more {
                    self.filtered.len() > self.page_size
                } else {
                    true
                };
                tracing::info!(
                    total = self.all_items.len(),
                    filtered = self.filtered.len(),
                    "Catalog replaced"
                );
                self.emit(CatalogEventKind::ItemsReplaced {
                    total: self.all_items.len(),
                    filtered: self.filtered.len(),
                });
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Catalog fetch failed");
                self.error = Some(message.clone());
                self.emit(CatalogEventKind::FetchFailed { message });
            }
        }
        true
    }

    /// Fetch through `loader` and apply the result
    pub async fn fetch_with(&mut self, loader: &dyn CatalogLoader) -> bool {
        let Some(ticket) = self.request_fetch() else {
            return false;
        };
        tracing::debug!(source = %loader.describe(), "Fetching catalog");
        let result = loader.fetch_catalog().await;
        self.complete_fetch(ticket, result)
    }

    // ========== Criteria ==========

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.criteria.keyword = keyword.into();
        self.criteria_changed();
    }

    pub fn set_pricing_filters(&mut self, pricing: impl IntoIterator<Item = PricingOption>) {
        self.criteria.pricing = pricing.into_iter().collect::<BTreeSet<_>>();
        self.criteria_changed();
    }

    /// Add or remove a single tier
    pub fn toggle_pricing(&mut self, option: PricingOption, enabled: bool) {
        if enabled {
            self.criteria.pricing.insert(option);
        } else {
            self.criteria.pricing.remove(&option);
        }
        self.criteria_changed();
    }

    /// Replace both criteria fields at once. Items are left alone.
    pub fn apply_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.criteria_changed();
    }

    pub fn reset_filters(&mut self) {
        self.criteria.clear();
        self.criteria_changed();
    }

    // ========== Paging ==========

    /// Append the next page of filtered items. Returns how many were appended.
    ///
    /// No-op while loading or when there is nothing more to show.
    pub fn load_more(&mut self) -> usize {
        if self.is_loading() || !self.has_more {
            return 0;
        }
        let next = self.page_index + 1;
        let appended = paginate::page(&self.filtered, next, self.page_size).len();
        self.page_index = next;
        self.has_more = paginate::has_more(self.filtered.len(), next, self.page_size);
        self.emit(CatalogEventKind::PageAppended {
            page_index: next,
            appended,
            has_more: self.has_more,
        });
        appended
    }

    // ========== Internals ==========

    fn criteria_changed(&mut self) {
        self.refilter();
        self.has_more = paginate::has_more(self.filtered.len(), 1, self.page_size);
        tracing::debug!(
            keyword = %self.criteria.keyword,
            pricing = self.criteria.pricing.len(),
            filtered = self.filtered.len(),
            "Criteria changed"
        );
        self.criteria_tx.send_replace(self.criteria.clone());
        self.emit(CatalogEventKind::CriteriaChanged {
            criteria: self.criteria.clone(),
        });
    }

    /// Rebuild the filtered cache and return to page 1
    fn refilter(&mut self) {
        self.filtered = filter::filter_indices(&self.all_items, &self.criteria);
        self.page_index = 1;
    }

    fn emit(&self, kind: CatalogEventKind) {
        // No subscribers is fine
        let _ = self.event_tx.send(CatalogEvent::new(kind));
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("phase", &self.phase())
            .field("items", &self.all_items.len())
            .field("criteria", &self.criteria)
            .field("page_index", &self.page_index)
            .field("has_more", &self.has_more)
            .finish()
    }
}
