//! Filter option derivation
//!
//! Computes the available filter choices (shapes, styles, metals, price
//! buckets) from the currently loaded product set. Pure function of its
//! input: safe to call on every snapshot replacement, output is always a
//! fresh value, never mutated in place.

use crate::product::{FilterField, Product};
use serde::{Deserialize, Serialize};

/// Reserved filter value meaning "no constraint"
pub const ALL: &str = "All";

/// Fallback price bucket labels used when the product set has no positive
/// prices to derive quartiles from
pub const FALLBACK_BUCKETS: [&str; 3] = ["Below $500", "$500–$1000", "$1000+"];

/// Derived, read-only snapshot of available filter choices
///
/// Each list is deduplicated, ordered first-seen-in-input, and prefixed
/// with the "All" sentinel for direct use in a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub shapes: Vec<String>,
    pub styles: Vec<String>,
    pub metals: Vec<String>,
    pub price_buckets: Vec<String>,
}

/// Compute available filter choices from a product set
///
/// An empty product set is valid and yields lists containing only the
/// "All" sentinel (plus the fallback price buckets).
pub fn derive_options(products: &[Product]) -> FilterOptions {
    FilterOptions {
        shapes: distinct_values(products, FilterField::Shape),
        styles: distinct_values(products, FilterField::Style),
        metals: distinct_values(products, FilterField::Metal),
        price_buckets: derive_price_buckets(products),
    }
}

/// Ordered-unique values for one field, "All" sentinel first
///
/// Deduplication is case-insensitive, keeping the first-seen casing, since
/// keyword matching downstream is case-insensitive as well.
fn distinct_values(products: &[Product], field: FilterField) -> Vec<String> {
    let mut values = vec![ALL.to_string()];
    let mut seen: Vec<String> = Vec::new();

    for product in products {
        let Some(value) = field.primary(product) else {
            continue;
        };
        let key = value.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            values.push(value.to_string());
        }
    }

    values
}

/// Derive quartile-based price buckets from positive prices
///
/// Emits "All", "Under Q1", "Q1–Q2", "Q2–Q3", "Above Q3". Falls back to a
/// fixed bucket set when no positive price exists.
///
/// Quartiles can collide after whole-dollar rounding (uniform or
/// near-uniform catalogs); a range bucket whose bounds collapse to the
/// same dollar is skipped, so the emitted labels are always unique. The
/// remaining Under/Above pair still covers the whole price axis because
/// both bounds are inclusive.
fn derive_price_buckets(products: &[Product]) -> Vec<String> {
    let mut prices: Vec<f64> = products.iter().map(|p| p.price).filter(|p| *p > 0.0).collect();

    let mut buckets = vec![ALL.to_string()];
    if prices.is_empty() {
        buckets.extend(FALLBACK_BUCKETS.iter().map(|b| b.to_string()));
        return buckets;
    }

    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let q1 = percentile(&prices, 0.25).round() as i64;
    let q2 = percentile(&prices, 0.50).round() as i64;
    let q3 = percentile(&prices, 0.75).round() as i64;

    buckets.push(format!("Under ${q1}"));
    if q1 != q2 {
        buckets.push(format!("${q1}–${q2}"));
    }
    if q2 != q3 {
        buckets.push(format!("${q2}–${q3}"));
    }
    buckets.push(format!("Above ${q3}"));
    buckets
}

/// Percentile of a sorted slice with linear interpolation between order
/// statistics
///
/// `q` in [0, 1]. Caller guarantees `sorted` is non-empty and ascending.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// A price range parsed back out of a bucket label
///
/// Bucket labels are the exchange format between the deriver and the
/// predicate engine, so the parser accepts every label shape either side
/// produces: "Under $X" / "Below $X", "$A–$B" (en dash or hyphen),
/// "Above $X" / "Over $X", and the "$X+" fallback form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceBucket {
    /// price <= bound
    Under(f64),
    /// low <= price <= high
    Between(f64, f64),
    /// bound <= price
    Over(f64),
}

impl PriceBucket {
    /// Parse a bucket label; returns None for the "All" sentinel or an
    /// unrecognized label
    pub fn parse(label: &str) -> Option<PriceBucket> {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            return None;
        }

        let lower = trimmed.to_lowercase();
        if let Some(rest) = lower.strip_prefix("under ").or_else(|| lower.strip_prefix("below ")) {
            return parse_amount(rest).map(PriceBucket::Under);
        }
        if let Some(rest) = lower.strip_prefix("above ").or_else(|| lower.strip_prefix("over ")) {
            return parse_amount(rest).map(PriceBucket::Over);
        }
        if let Some(rest) = lower.strip_suffix('+') {
            return parse_amount(rest).map(PriceBucket::Over);
        }

        // Range form: "$A–$B" (en dash) or "$A-$B"
        let (low, high) = lower.split_once('–').or_else(|| lower.split_once('-'))?;
        Some(PriceBucket::Between(parse_amount(low)?, parse_amount(high)?))
    }

    /// Whether a price falls inside this bucket (bounds inclusive)
    pub fn matches(&self, price: f64) -> bool {
        match *self {
            PriceBucket::Under(high) => price <= high,
            PriceBucket::Between(low, high) => low <= price && price <= high,
            PriceBucket::Over(low) => low <= price,
        }
    }
}

/// Parse a dollar amount fragment, tolerating "$" and "," separators
fn parse_amount(fragment: &str) -> Option<f64> {
    let cleaned: String = fragment
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
