//! Filter predicate engine
//!
//! Applies a composed `FilterSpec` to a product set. One generic engine
//! replaces the per-category-page copies in the original storefront: the
//! predicate is the logical AND of per-field sub-predicates, and a
//! sub-predicate is skipped entirely when its spec field is absent or the
//! "All" sentinel.
//!
//! Filtering is strict: a spec that matches nothing returns nothing. There
//! is deliberately no fallback to the unfiltered set.

use crate::options::{PriceBucket, ALL};
use crate::product::{FilterField, Product};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Result ordering applied after filtering
///
/// All orderings are stable: ties keep the originally fetched order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Backend relevance order (the fetched order, untouched)
    #[default]
    Best,
    /// Price low to high
    PriceAsc,
    /// Price high to low
    PriceDesc,
    /// Most recently listed first; products without a listing date last
    Newest,
}

/// User-chosen constraints for a product list
///
/// Absence of a field (or the "All" sentinel) means "no constraint for
/// this field".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Shape keyword (e.g. "round")
    pub shape: Option<String>,
    /// Style keyword (e.g. "Halo")
    pub style: Option<String>,
    /// Metal code keyword (e.g. "14W")
    pub metal: Option<String>,
    /// Price bucket label from the derived option list
    pub price_bucket: Option<String>,
    /// Restrict to quick-ship products
    #[serde(default)]
    pub shipping: bool,
    /// Result ordering
    #[serde(default)]
    pub sort: SortOrder,
}

impl FilterSpec {
    /// Whether a single product satisfies every present constraint
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(keyword) = constraint(&self.shape) {
            if !product.matches_keyword(FilterField::Shape, keyword) {
                return false;
            }
        }
        if let Some(keyword) = constraint(&self.style) {
            if !product.matches_keyword(FilterField::Style, keyword) {
                return false;
            }
        }
        if let Some(keyword) = constraint(&self.metal) {
            if !product.matches_keyword(FilterField::Metal, keyword) {
                return false;
            }
        }
        if let Some(label) = constraint(&self.price_bucket) {
            // An unparseable label constrains nothing
            if let Some(bucket) = PriceBucket::parse(label) {
                if !bucket.matches(product.price) {
                    return false;
                }
            }
        }
        if self.shipping && !product.quick_ship {
            return false;
        }
        true
    }
}

/// Treat None, empty, and the "All" sentinel as "no constraint"
fn constraint(field: &Option<String>) -> Option<&str> {
    match field.as_deref() {
        None => None,
        Some(value) if value.trim().is_empty() => None,
        Some(value) if value.eq_ignore_ascii_case(ALL) => None,
        Some(value) => Some(value),
    }
}

/// Apply a filter spec to a product set, preserving source ordering
///
/// Pure function: the input slice is never mutated. Sorting happens after
/// filtering and is stable, so ties keep the fetched order.
pub fn apply_filters(products: &[Product], spec: &FilterSpec) -> Vec<Product> {
    let mut result: Vec<Product> = products
        .iter()
        .filter(|product| spec.matches(product))
        .cloned()
        .collect();

    match spec.sort {
        SortOrder::Best => {}
        SortOrder::PriceAsc => {
            result.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
        }
        SortOrder::PriceDesc => {
            result.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));
        }
        SortOrder::Newest => {
            result.sort_by(|a, b| match (a.listed_at, b.listed_at) {
                (Some(a_at), Some(b_at)) => b_at.cmp(&a_at),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
    }

    result
}
