//! # Filter Engine
//!
//! Combines the keyword and pricing predicates. Every function here is
//! total and order-preserving.

use crate::models::{FilterCriteria, Item};

/// Check a single item against the criteria
pub fn matches(item: &Item, criteria: &FilterCriteria) -> bool {
    passes(item, &criteria.keyword.to_lowercase(), criteria)
}

/// Items matching the criteria, in their original order
pub fn filter_items<'a>(items: &'a [Item], criteria: &FilterCriteria) -> Vec<&'a Item> {
    let needle = criteria.keyword.to_lowercase();
    items
        .iter()
        .filter(|item| passes(item, &needle, criteria))
        .collect()
}

/// Positions of the matching items, ascending
pub fn filter_indices(items: &[Item], criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.keyword.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| passes(item, &needle, criteria))
        .map(|(i, _)| i)
        .collect()
}

/// `needle` is the criteria keyword, already lowercased
fn passes(item: &Item, needle: &str, criteria: &FilterCriteria) -> bool {
    let keyword_match = needle.is_empty() || item.title.to_lowercase().contains(needle);
    let pricing_match =
        criteria.pricing.is_empty() || criteria.pricing.contains(&item.pricing_option);
    keyword_match && pricing_match
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricingOption;

    fn sample() -> Vec<Item> {
        vec![
            Item::new("1", "Oxford Shirt", PricingOption::Paid).with_price(30.0),
            Item::new("2", "Summer Dress", PricingOption::Free),
            Item::new("3", "T-SHIRT basic", PricingOption::Free),
            Item::new("4", "Denim Jacket", PricingOption::ViewOnly),
            Item::new("5", "shirt dress", PricingOption::ViewOnly),
        ]
    }

    fn ids(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let items = sample();
        let result = filter_items(&items, &FilterCriteria::new());
        assert_eq!(ids(&result), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_keyword_is_case_insensitive_substring() {
        let items = sample();
        let criteria = FilterCriteria::new().with_keyword("ShIrT");
        assert_eq!(ids(&filter_items(&items, &criteria)), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_pricing_set() {
        let items = sample();
        let criteria =
            FilterCriteria::new().with_pricing([PricingOption::Free, PricingOption::ViewOnly]);
        assert_eq!(ids(&filter_items(&items, &criteria)), vec!["2", "3", "4", "5"]);
    }

    #[test]
    fn test_keyword_and_pricing_combine() {
        let items = sample();
        let criteria = FilterCriteria::new()
            .with_keyword("dress")
            .with_pricing([PricingOption::ViewOnly]);
        assert_eq!(ids(&filter_items(&items, &criteria)), vec!["5"]);
        assert!(matches(&items[4], &criteria));
        assert!(!matches(&items[1], &criteria));
    }

    #[test]
    fn test_indices_agree_with_items() {
        let items = sample();
        let criteria = FilterCriteria::new().with_keyword("shirt");
        let by_index: Vec<&Item> = filter_indices(&items, &criteria)
            .into_iter()
            .map(|i| &items[i])
            .collect();
        assert_eq!(by_index, filter_items(&items, &criteria));
    }

    #[test]
    fn test_filter_is_idempotent_subsequence() {
        let items = sample();
        let criteria = FilterCriteria::new()
            .with_keyword("s")
            .with_pricing([PricingOption::Free, PricingOption::Paid]);

        let once: Vec<Item> = filter_items(&items, &criteria).into_iter().cloned().collect();
        let twice: Vec<Item> = filter_items(&once, &criteria).into_iter().cloned().collect();
        assert_eq!(once, twice);

        // Order-preserving: indices strictly increase
        let indices = filter_indices(&items, &criteria);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_no_match_is_empty() {
        let items = sample();
        let criteria = FilterCriteria::new().with_keyword("sneaker");
        assert!(filter_items(&items, &criteria).is_empty());
        assert!(filter_items(&[], &FilterCriteria::new()).is_empty());
    }
}
