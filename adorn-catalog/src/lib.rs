//! # ADORN Catalog Library
//!
//! Product catalog access and the generic filter engine shared by every
//! category page:
//! - Product model with lenient field matching across inconsistent feeds
//! - Filter option derivation (shapes/styles/metals/price buckets)
//! - Filter predicate engine (AND of per-field constraints, stable sort)
//! - REST client for the paginated product list endpoints
//! - Last-write-wins snapshot store (stale-while-revalidate)

pub mod client;
pub mod filter;
pub mod options;
pub mod product;
pub mod store;

pub use client::{CatalogClient, CatalogError, ProductPage};
pub use filter::{apply_filters, FilterSpec, SortOrder};
pub use options::{derive_options, FilterOptions, PriceBucket, ALL};
pub use product::{FilterField, Product};
pub use store::{CatalogSnapshot, CatalogStore};
