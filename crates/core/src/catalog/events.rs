//! # Catalog Events
//!
//! Emitted by the store on every mutation. Subscribers (the query sync
//! adapter, the server's SSE stream) observe the store only through these.

use crate::models::FilterCriteria;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of catalog event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CatalogEventKind {
    /// A fetch was issued
    FetchStarted { ticket: u64 },
    /// A fetch succeeded and replaced the catalog
    ItemsReplaced { total: usize, filtered: usize },
    /// A fetch failed; existing items were kept
    FetchFailed { message: String },
    /// Keyword or pricing filters changed
    CriteriaChanged { criteria: FilterCriteria },
    /// Load-more appended a page
    PageAppended {
        page_index: usize,
        appended: usize,
        has_more: bool,
    },
}

/// An event from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEvent {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    #[serde(flatten)]
    pub kind: CatalogEventKind,
}

impl CatalogEvent {
    /// Create a new event
    pub fn new(kind: CatalogEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Criteria carried by a `CriteriaChanged` event
    pub fn criteria(&self) -> Option<&FilterCriteria> {
        match &self.kind {
            CatalogEventKind::CriteriaChanged { criteria } => Some(criteria),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricingOption;

    #[test]
    fn test_event_json_shape() {
        let criteria = FilterCriteria::new()
            .with_keyword("dress")
            .with_pricing([PricingOption::Paid]);
        let event = CatalogEvent::new(CatalogEventKind::CriteriaChanged {
            criteria: criteria.clone(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "criteria_changed");
        assert_eq!(json["criteria"]["keyword"], "dress");
        assert_eq!(json["criteria"]["pricing"][0], "Paid");
        assert_eq!(event.criteria(), Some(&criteria));
    }

    #[test]
    fn test_non_criteria_event() {
        let event = CatalogEvent::new(CatalogEventKind::FetchStarted { ticket: 1 });
        assert!(event.criteria().is_none());
    }
}
