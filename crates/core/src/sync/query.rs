//! # Query Codec
//!
//! Converts criteria to and from the shareable query string
//! `keyword=<value>&pricing=<Tok,Tok>`.

use crate::models::{FilterCriteria, PricingOption};
use std::borrow::Cow;

pub const KEYWORD_KEY: &str = "keyword";
pub const PRICING_KEY: &str = "pricing";

/// Parse criteria from a query string.
///
/// A leading `?` is ignored, the first occurrence of a key wins, unknown
/// keys and unknown pricing tokens are dropped.
pub fn parse_query(search: &str) -> FilterCriteria {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut keyword: Option<String> = None;
    let mut pricing: Option<String> = None;

    for pair in search.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let slot = match &*decode_component(raw_key) {
            KEYWORD_KEY => &mut keyword,
            PRICING_KEY => &mut pricing,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(decode_component(raw_value).into_owned());
        }
    }

    FilterCriteria {
        keyword: keyword.unwrap_or_default(),
        pricing: pricing
            .as_deref()
            .map(parse_pricing_list)
            .unwrap_or_default()
            .into_iter()
            .collect(),
    }
}

/// Parse a comma-separated tier list, dropping unknown tokens
pub fn parse_pricing_list(value: &str) -> Vec<PricingOption> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|token| match token.parse::<PricingOption>() {
            Ok(option) => Some(option),
            Err(e) => {
                tracing::debug!("Dropping query token: {}", e);
                None
            }
        })
        .collect()
}

/// Serialize criteria; empty dimensions are omitted and `keyword` comes first
pub fn to_query(criteria: &FilterCriteria) -> String {
    let mut params: Vec<String> = Vec::with_capacity(2);
    if !criteria.keyword.is_empty() {
        params.push(format!(
            "{}={}",
            KEYWORD_KEY,
            urlencoding::encode(&criteria.keyword)
        ));
    }
    if !criteria.pricing.is_empty() {
        let tokens: Vec<&str> = criteria.pricing.iter().map(|p| p.token()).collect();
        params.push(format!("{}={}", PRICING_KEY, tokens.join(",")));
    }
    params.join("&")
}

/// Percent-decode with `+` as space; malformed input is returned as-is
fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['%', '+']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(spaced),
    }
}
