//! # Storefront Models
//!
//! Catalog data types shared by the store, the loaders and the query
//! codec. Items are immutable once fetched; criteria are the only
//! user-editable state.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Pricing tier of a catalog item
///
/// Declaration order is the canonical order used when serializing a set
/// of tiers (Free, Paid, ViewOnly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PricingOption {
    Free,
    Paid,
    ViewOnly,
}

impl PricingOption {
    /// Get all tiers in canonical order
    pub fn all() -> [PricingOption; 3] {
        [
            PricingOption::Free,
            PricingOption::Paid,
            PricingOption::ViewOnly,
        ]
    }

    /// Query-string token
    pub fn token(&self) -> &'static str {
        match self {
            PricingOption::Free => "Free",
            PricingOption::Paid => "Paid",
            PricingOption::ViewOnly => "ViewOnly",
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            PricingOption::Free => "Free",
            PricingOption::Paid => "Paid",
            PricingOption::ViewOnly => "View Only",
        }
    }
}

impl fmt::Display for PricingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Error for an unrecognized pricing token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pricing option: {0}")]
pub struct UnknownPricingOption(pub String);

impl FromStr for PricingOption {
    type Err = UnknownPricingOption;

    /// Accepts the canonical tokens case-insensitively, plus the
    /// display spelling "View Only".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PricingOption::Free),
            "paid" => Ok(PricingOption::Paid),
            "viewonly" | "view only" => Ok(PricingOption::ViewOnly),
            _ => Err(UnknownPricingOption(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for PricingOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireItem")]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub image_path: String,
    pub pricing_option: PricingOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

impl Item {
    /// Create an item with no price and no owner
    pub fn new(id: impl Into<String>, title: impl Into<String>, pricing: PricingOption) -> Self {
        let id = id.into();
        Self {
            image_path: format!("/images/{}.png", id),
            id,
            title: title.into(),
            pricing_option: pricing,
            price: None,
            owner_name: None,
        }
    }

    /// Set the price
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the owner name
    pub fn with_owner(mut self, name: impl Into<String>) -> Self {
        self.owner_name = Some(name.into());
        self
    }

    /// Price as shown on a card: "$<price>" for paid items, the tier name otherwise
    pub fn price_label(&self) -> String {
        match (self.pricing_option, self.price) {
            (PricingOption::Paid, Some(price)) => format!("${}", price),
            (PricingOption::Paid, None) => "$".to_string(),
            (other, _) => other.display_name().to_string(),
        }
    }

    /// Owner as shown on a card
    pub fn owner_label(&self) -> &str {
        self.owner_name.as_deref().unwrap_or("Unknown User")
    }
}

/// Item as delivered by the catalog endpoint
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    id: String,
    title: String,
    #[serde(default)]
    image_path: String,
    pricing_option: PricingOption,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    owner_name: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
}

#[derive(Deserialize)]
struct WireUser {
    #[serde(default)]
    name: Option<String>,
}

impl From<WireItem> for Item {
    fn from(wire: WireItem) -> Self {
        let owner_name = wire
            .owner_name
            .or_else(|| wire.user.and_then(|u| u.name))
            .filter(|n| !n.is_empty());
        Self {
            id: wire.id,
            title: wire.title,
            image_path: wire.image_path,
            pricing_option: wire.pricing_option,
            price: wire.price,
            owner_name,
        }
    }
}

/// Active keyword and accepted pricing tiers
///
/// An empty keyword or an empty set means "no constraint" on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub pricing: BTreeSet<PricingOption>,
}

impl FilterCriteria {
    /// Criteria with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keyword
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Set the accepted tiers
    pub fn with_pricing(mut self, pricing: impl IntoIterator<Item = PricingOption>) -> Self {
        self.pricing = pricing.into_iter().collect();
        self
    }

    /// Check if neither dimension is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.keyword.is_empty() && self.pricing.is_empty()
    }

    /// Reset both dimensions
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
