//! Product model and declarative field matching
//!
//! Product records arrive from several backend feeds with inconsistent
//! schemas (a shape may live in `shape`, a tag, or the title). Matching is
//! therefore defined as an ordered list of field accessors per filterable
//! field, each tested with case-insensitive substring containment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single catalog product (ring setting or loose diamond)
///
/// Unknown backend fields are preserved in `extra` as an opaque passthrough
/// for display; the filter engine never reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Backend product id, unique and stable within a loaded page
    pub id: String,

    /// Display title
    #[serde(alias = "name")]
    pub title: String,

    /// Style line (e.g. "Solitaire", "Halo"); empty if the feed omits it
    #[serde(default, alias = "subtitle")]
    pub style: String,

    /// Primary shape keyword (e.g. "round", "oval")
    #[serde(default)]
    pub shape: String,

    /// Metal codes the product is available in (e.g. "14W", "18Y")
    #[serde(default, alias = "metal_codes")]
    pub metals: Vec<String>,

    /// Price in the backend's currency unit; never negative after
    /// normalization
    #[serde(default)]
    pub price: f64,

    /// Free-form tags; consulted as a matching fallback
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether the product qualifies for expedited shipping
    #[serde(default)]
    pub quick_ship: bool,

    /// When the product was listed; drives the "newest" sort
    #[serde(default)]
    pub listed_at: Option<DateTime<Utc>>,

    /// Unrecognized backend fields, passed through untouched for display
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Clamp malformed numeric fields instead of rejecting the record
    ///
    /// A negative price from a bad feed becomes 0 so the filter and
    /// deriver never see out-of-domain values.
    pub fn normalize(mut self) -> Self {
        if self.price.is_nan() || self.price < 0.0 {
            self.price = 0.0;
        }
        self
    }

    /// Case-insensitive substring test of `keyword` against the ordered
    /// accessor list for `field`
    pub fn matches_keyword(&self, field: FilterField, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        field
            .candidates(self)
            .any(|candidate| candidate.to_lowercase().contains(&needle))
    }
}

/// Filterable product fields with lenient keyword matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Shape,
    Style,
    Metal,
}

impl FilterField {
    /// Ordered field accessors consulted for keyword matching
    ///
    /// Order mirrors how specific each source is: the dedicated field
    /// first, then tags, then the display title as a last resort.
    pub fn candidates<'p>(&self, product: &'p Product) -> Box<dyn Iterator<Item = &'p str> + 'p> {
        match self {
            FilterField::Shape => Box::new(
                std::iter::once(product.shape.as_str())
                    .chain(product.tags.iter().map(String::as_str))
                    .chain(std::iter::once(product.title.as_str())),
            ),
            FilterField::Style => Box::new(
                std::iter::once(product.style.as_str())
                    .chain(product.tags.iter().map(String::as_str))
                    .chain(std::iter::once(product.title.as_str())),
            ),
            FilterField::Metal => Box::new(
                product
                    .metals
                    .iter()
                    .map(String::as_str)
                    .chain(product.tags.iter().map(String::as_str)),
            ),
        }
    }

    /// First non-empty value for this field, used for option derivation
    pub fn primary<'p>(&self, product: &'p Product) -> Option<&'p str> {
        match self {
            FilterField::Shape => non_empty(&product.shape),
            FilterField::Style => non_empty(&product.style),
            FilterField::Metal => product.metals.iter().map(String::as_str).find(|m| !m.is_empty()),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(shape: &str, tags: &[&str], title: &str) -> Product {
        Product {
            id: "p1".to_string(),
            title: title.to_string(),
            style: String::new(),
            shape: shape.to_string(),
            metals: vec!["14W".to_string()],
            price: 1200.0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            quick_ship: false,
            listed_at: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_matches_dedicated_field() {
        let p = product("round", &[], "Classic Solitaire");
        assert!(p.matches_keyword(FilterField::Shape, "Round"));
        assert!(!p.matches_keyword(FilterField::Shape, "oval"));
    }

    #[test]
    fn test_matches_falls_through_to_tags_and_title() {
        // Feed without a dedicated shape field
        let p = product("", &["oval-cut"], "Oval Halo Ring");
        assert!(p.matches_keyword(FilterField::Shape, "oval"));

        let p = product("", &[], "Pear Shape East-West");
        assert!(p.matches_keyword(FilterField::Shape, "pear"));
    }

    #[test]
    fn test_metal_matching_uses_codes() {
        let p = product("round", &[], "Band");
        assert!(p.matches_keyword(FilterField::Metal, "14w"));
        assert!(!p.matches_keyword(FilterField::Metal, "18Y"));
    }

    #[test]
    fn test_normalize_clamps_negative_price() {
        let mut p = product("round", &[], "Band");
        p.price = -5.0;
        assert_eq!(p.normalize().price, 0.0);
    }

    #[test]
    fn test_deserialize_lenient_fields() {
        let json = serde_json::json!({
            "id": "s-100",
            "name": "Twisted Vine",
            "subtitle": "Pavé",
            "price": 990.0,
            "sku": "TV-990"
        });
        let p: Product = serde_json::from_value(json).unwrap();
        assert_eq!(p.title, "Twisted Vine");
        assert_eq!(p.style, "Pavé");
        assert!(p.shape.is_empty());
        assert!(p.metals.is_empty());
        // Unknown field preserved for display passthrough
        assert_eq!(p.extra["sku"], "TV-990");
    }
}
